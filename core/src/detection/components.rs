use ndarray::Array2;

/// Two-pass connected-component labeling with union-find, 8-connectivity.
///
/// Returns one pixel list per component, in first-encounter (row-major)
/// order, so the output is deterministic for identical masks.
pub(crate) fn connected_components(mask: &Array2<bool>) -> Vec<Vec<(usize, usize)>> {
    let (height, width) = mask.dim();
    let mut labels: Array2<usize> = Array2::zeros((height, width));
    let mut uf = UnionFind::new();

    for y in 0..height {
        for x in 0..width {
            if !mask[(y, x)] {
                continue;
            }
            // Already-visited 8-neighbors: left, up-left, up, up-right.
            let mut neighbor_roots = [0usize; 4];
            let mut count = 0;
            let mut consider = |ny: usize, nx: usize| {
                if mask[(ny, nx)] {
                    neighbor_roots[count] = labels[(ny, nx)];
                    count += 1;
                }
            };
            if x > 0 {
                consider(y, x - 1);
            }
            if y > 0 {
                if x > 0 {
                    consider(y - 1, x - 1);
                }
                consider(y - 1, x);
                if x + 1 < width {
                    consider(y - 1, x + 1);
                }
            }

            let label = if count == 0 {
                uf.make_set()
            } else {
                let first = neighbor_roots[0];
                for &other in &neighbor_roots[1..count] {
                    uf.union(first, other);
                }
                first
            };
            labels[(y, x)] = label;
        }
    }

    // Second pass: gather pixels under their root labels.
    let mut index_of_root: Vec<Option<usize>> = vec![None; uf.len() + 1];
    let mut components: Vec<Vec<(usize, usize)>> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if !mask[(y, x)] {
                continue;
            }
            let root = uf.find(labels[(y, x)]);
            let idx = match index_of_root[root] {
                Some(idx) => idx,
                None => {
                    components.push(Vec::new());
                    index_of_root[root] = Some(components.len() - 1);
                    components.len() - 1
                }
            };
            components[idx].push((x, y));
        }
    }
    components
}

/// Union-find over labels 1..=len with path compression.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new() -> Self {
        // Slot 0 is unused so label 0 can mean "unlabeled".
        Self { parent: vec![0] }
    }

    fn len(&self) -> usize {
        self.parent.len() - 1
    }

    fn make_set(&mut self) -> usize {
        let label = self.parent.len();
        self.parent.push(label);
        label
    }

    fn find(&mut self, label: usize) -> usize {
        let mut root = label;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = label;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Array2<bool> {
        let height = rows.len();
        let width = rows[0].len();
        let mut mask = Array2::from_elem((height, width), false);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                mask[(y, x)] = ch == '#';
            }
        }
        mask
    }

    #[test]
    fn empty_mask_has_no_components() {
        let mask = mask_from(&["....", "....", "...."]);
        assert!(connected_components(&mask).is_empty());
    }

    #[test]
    fn separate_blobs_get_separate_components() {
        let mask = mask_from(&[
            "##....",
            "##....",
            "....##",
            "....##",
        ]);
        let comps = connected_components(&mask);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].len(), 4);
        assert_eq!(comps[1].len(), 4);
    }

    #[test]
    fn diagonal_pixels_join_under_eight_connectivity() {
        let mask = mask_from(&[
            "#..",
            ".#.",
            "..#",
        ]);
        let comps = connected_components(&mask);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].len(), 3);
    }

    #[test]
    fn u_shape_merges_into_one_component() {
        // The two arms only meet at the bottom row, which forces a union of
        // provisional labels.
        let mask = mask_from(&[
            "#.#",
            "#.#",
            "###",
        ]);
        let comps = connected_components(&mask);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].len(), 7);
    }
}
