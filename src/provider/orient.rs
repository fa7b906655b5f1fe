use std::collections::VecDeque;

/// Tests whether faces can be flipped so that every interior edge is
/// traversed once in each direction.
///
/// `edge_uses[e]` lists `(face, forward)` for every use of edge `e`. Only
/// edges used by exactly two distinct faces constrain the orientation.
pub(crate) fn is_orientable(face_count: usize, edge_uses: &[Vec<(usize, bool)>]) -> bool {
    let mut face_edges: Vec<Vec<usize>> = vec![Vec::new(); face_count];
    for (edge, uses) in edge_uses.iter().enumerate() {
        for &(face, _) in uses {
            face_edges[face].push(edge);
        }
    }

    let mut flip: Vec<Option<bool>> = vec![None; face_count];
    let mut queue = VecDeque::new();

    for seed in 0..face_count {
        if flip[seed].is_some() {
            continue;
        }
        flip[seed] = Some(false);
        queue.push_back(seed);

        while let Some(face) = queue.pop_front() {
            let Some(face_flip) = flip[face] else {
                continue;
            };
            for &edge in &face_edges[face] {
                let [(a, a_fwd), (b, b_fwd)] = edge_uses[edge][..] else {
                    continue;
                };
                if a == b {
                    continue;
                }
                let (mine, (other, other_fwd)) = if a == face {
                    (a_fwd, (b, b_fwd))
                } else {
                    (b_fwd, (a, a_fwd))
                };
                // Oriented directions must disagree across the edge.
                let required = !(mine ^ face_flip ^ other_fwd);
                match flip[other] {
                    Some(existing) if existing != required => return false,
                    Some(_) => {}
                    None => {
                        flip[other] = Some(required);
                        queue.push_back(other);
                    }
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_are_consistent() {
        let uses = vec![vec![(0, true), (1, false)]];
        assert!(is_orientable(2, &uses));
    }

    #[test]
    fn same_direction_is_fixed_by_flipping() {
        let uses = vec![vec![(0, true), (1, true)]];
        assert!(is_orientable(2, &uses));
    }

    #[test]
    fn mobius_strip_is_not_orientable() {
        // Three quads in a ring; the closing edge is traversed with a twist.
        let uses = vec![
            vec![(0, true), (1, false)],
            vec![(1, true), (2, false)],
            vec![(2, true), (0, true)],
        ];
        assert!(!is_orientable(3, &uses));
    }
}
