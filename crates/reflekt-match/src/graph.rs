/// Directed graph over generic parameter positions. An edge `a -> b` means
/// a constraint of `a` mentions `b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: Vec<Vec<usize>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl DependencyGraph {
    pub fn new(nodes: usize) -> Self {
        Self {
            edges: vec![Vec::new(); nodes],
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Self edges and edges to unknown nodes are ignored.
    pub fn add_edge(&mut self, from: usize, to: usize) -> bool {
        if from == to || to >= self.edges.len() {
            return false;
        }
        let Some(targets) = self.edges.get_mut(from) else {
            return false;
        };
        if targets.contains(&to) {
            return false;
        }
        targets.push(to);
        true
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first cycle found, starting and ending on the same node.
    pub fn find_cycle(&self) -> Option<Vec<usize>> {
        let mut marks = vec![Mark::Unvisited; self.edges.len()];
        let mut stack = Vec::new();
        (0..self.edges.len()).find_map(|start| {
            if marks[start] == Mark::Unvisited {
                self.visit(start, &mut marks, &mut stack)
            } else {
                None
            }
        })
    }

    fn visit(&self, node: usize, marks: &mut [Mark], stack: &mut Vec<usize>) -> Option<Vec<usize>> {
        marks[node] = Mark::InProgress;
        stack.push(node);
        for &next in self.neighbors(node) {
            match marks[next] {
                Mark::InProgress => {
                    let start = stack.iter().position(|&n| n == next).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    if let Some(cycle) = self.visit(next, marks, stack) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }
        stack.pop();
        marks[node] = Mark::Done;
        None
    }
}
