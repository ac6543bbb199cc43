use crate::libs::error::{HeatmapError, Result};
use crate::libs::trait_data::AlignedVector;
use serde::Serialize;

/// The strains that have data for one trait, with their values
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StrainValues {
    /// Position of the trait in the input list
    pub index: usize,
    pub strains: Vec<String>,
    pub values: Vec<f64>,
}

/// For every trait in `order`, keep only the strains whose slot is filled.
///
/// Vectors must hold one slot per strain. Strains keep their original
/// relative order.
///
/// ```
/// use gnhm::libs::align::retrieve_strains_and_values;
///
/// let strains = vec!["A".to_string(), "B".to_string(), "C".to_string()];
/// let vectors = vec![vec![None, Some(2.0), Some(3.0)], vec![Some(1.0), None, Some(3.0)]];
/// let aligned = retrieve_strains_and_values(&[1, 0], &strains, &vectors).unwrap();
///
/// assert_eq!(aligned[0].index, 1);
/// assert_eq!(aligned[0].strains, vec!["A", "C"]);
/// assert_eq!(aligned[0].values, vec![1.0, 3.0]);
/// assert_eq!(aligned[1].strains, vec!["B", "C"]);
/// ```
pub fn retrieve_strains_and_values(
    order: &[usize],
    strains: &[String],
    vectors: &[AlignedVector],
) -> Result<Vec<StrainValues>> {
    order
        .iter()
        .map(|&index| {
            let vector = vectors.get(index).ok_or_else(|| {
                HeatmapError::MalformedMergeTree(format!(
                    "trait index {} out of range for {} traits",
                    index,
                    vectors.len()
                ))
            })?;

            let init = StrainValues {
                index,
                ..Default::default()
            };
            Ok(strains
                .iter()
                .zip(vector.iter())
                .fold(init, |mut acc, (strain, slot)| {
                    if let Some(value) = slot {
                        acc.strains.push(strain.clone());
                        acc.values.push(*value);
                    }
                    acc
                }))
        })
        .collect()
}

/// Tab separated input for the mapping engine.
///
/// Header `Trait` plus every strain; then one row per aligned trait, numbered
/// from 1, with `x` where the trait has no value for a strain.
pub fn generate_traits_file(strains: &[String], aligned: &[StrainValues]) -> String {
    let mut out = format!("Trait\t{}\n", strains.join("\t"));

    for (pos, sv) in aligned.iter().enumerate() {
        // present strains are a subsequence of `strains`
        let mut present = sv.strains.iter().zip(sv.values.iter()).peekable();
        let cells: Vec<String> = strains
            .iter()
            .map(|strain| match present.peek() {
                Some((name, value)) if *name == strain => {
                    let cell = format!("{}", value);
                    present.next();
                    cell
                }
                _ => "x".to_string(),
            })
            .collect();
        out += &format!("{}\t{}\n", pos + 1, cells.join("\t"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strains() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    fn vectors() -> Vec<AlignedVector> {
        vec![
            vec![None, Some(2.0), Some(3.0)],
            vec![Some(1.0), None, Some(3.0)],
            vec![None, None, None],
        ]
    }

    #[test]
    fn test_retrieve_strains_and_values() {
        let aligned = retrieve_strains_and_values(&[1, 0], &strains(), &vectors()).unwrap();

        assert_eq!(
            aligned,
            vec![
                StrainValues {
                    index: 1,
                    strains: vec!["A".to_string(), "C".to_string()],
                    values: vec![1.0, 3.0],
                },
                StrainValues {
                    index: 0,
                    strains: vec!["B".to_string(), "C".to_string()],
                    values: vec![2.0, 3.0],
                },
            ]
        );
    }

    #[test]
    fn test_no_state_leaks_between_traits() {
        let aligned = retrieve_strains_and_values(&[0, 2, 1], &strains(), &vectors()).unwrap();

        assert_eq!(aligned.len(), 3);
        assert!(aligned[1].strains.is_empty());
        assert!(aligned[1].values.is_empty());
        for sv in &aligned {
            assert_eq!(sv.strains.len(), sv.values.len());
        }
        assert_eq!(aligned[2].strains, vec!["A", "C"]);
    }

    #[test]
    fn test_bad_index() {
        assert!(retrieve_strains_and_values(&[5], &strains(), &vectors()).is_err());
    }

    #[test]
    fn test_generate_traits_file() {
        let aligned = retrieve_strains_and_values(&[1, 0, 2], &strains(), &vectors()).unwrap();
        let content = generate_traits_file(&strains(), &aligned);
        assert_eq!(
            content,
            "Trait\tA\tB\tC\n1\t1\tx\t3\n2\tx\t2\t3\n3\tx\tx\tx\n"
        );
    }
}
