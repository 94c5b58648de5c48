use super::{feature::substitution, Feature};
use crate::{
    container::compression_header::preservation_map::{
        substitution_matrix::Base, SubstitutionMatrix,
    },
    Error, Position, Result,
};

/// Restores read bases from the reference slab and the read features.
///
/// `reference_sequence` is the whole reference sequence the record is placed
/// on; positions with no feature copy the reference base. `None` is only
/// valid when the features cover every read position (e.g. base stretches).
pub(crate) fn resolve_bases(
    reference_sequence: Option<&[u8]>,
    substitution_matrix: &SubstitutionMatrix,
    features: &[Feature],
    alignment_start: Position,
    read_length: usize,
) -> Result<Vec<u8>> {
    let mut buf = vec![b'N'; read_length];

    // 0-based cursors into the reference sequence and the read
    let mut reference_position = usize::from(alignment_start) - 1;
    let mut read_position = 0;

    let copy_from_reference = |dst: &mut [u8], reference_position: usize| -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }

        let src = reference_sequence.ok_or_else(|| {
            Error::malformed("record requires a reference sequence, but none is available")
        })?;

        let end = reference_position + dst.len();

        let slab = src.get(reference_position..end).ok_or_else(|| {
            Error::malformed(format!(
                "reference position out of bounds: {end} > {}",
                src.len()
            ))
        })?;

        dst.copy_from_slice(slab);

        Ok(())
    };

    for feature in features {
        let feature_position = usize::from(feature.position()) - 1;

        if feature_position > read_length {
            return Err(Error::RecordValidation(format!(
                "feature position {} is out of range for read length {read_length}",
                feature.position()
            )));
        }

        // positions between features are implicit matches
        let match_len = feature_position
            .checked_sub(read_position)
            .ok_or_else(|| Error::RecordValidation("read features are out of order".into()))?;

        copy_from_reference(
            &mut buf[read_position..feature_position],
            reference_position,
        )?;

        reference_position += match_len;
        read_position = feature_position;

        match feature {
            Feature::Bases { bases, .. } => {
                write_bases(&mut buf, read_position, bases, read_length)?;
                read_position += bases.len();
                reference_position += bases.len();
            }
            Feature::Scores { .. } => {}
            Feature::ReadBase { base, .. } => {
                write_bases(&mut buf, read_position, &[*base], read_length)?;
                read_position += 1;
                reference_position += 1;
            }
            Feature::Substitution { value, .. } => {
                let code = match value {
                    substitution::Value::Code(code) => *code,
                    substitution::Value::Bases(..) => {
                        return Err(Error::invalid_state(
                            "substitution features carry codes after decoding",
                        ));
                    }
                };

                let src = reference_sequence.ok_or_else(|| {
                    Error::malformed(
                        "record requires a reference sequence, but none is available",
                    )
                })?;

                let reference_base = src
                    .get(reference_position)
                    .copied()
                    .map(|b| Base::try_from(b).unwrap_or(Base::N))
                    .ok_or_else(|| Error::malformed("reference position out of bounds"))?;

                let read_base = substitution_matrix.get(reference_base, code);
                write_bases(&mut buf, read_position, &[u8::from(read_base)], read_length)?;

                read_position += 1;
                reference_position += 1;
            }
            Feature::Insertion { bases, .. } => {
                write_bases(&mut buf, read_position, bases, read_length)?;
                read_position += bases.len();
            }
            Feature::Deletion { len, .. } => {
                reference_position += len;
            }
            Feature::InsertBase { base, .. } => {
                write_bases(&mut buf, read_position, &[*base], read_length)?;
                read_position += 1;
            }
            Feature::QualityScore { .. } => {}
            Feature::ReferenceSkip { len, .. } => {
                reference_position += len;
            }
            Feature::SoftClip { bases, .. } => {
                write_bases(&mut buf, read_position, bases, read_length)?;
                read_position += bases.len();
            }
            Feature::Padding { .. } => {}
            Feature::HardClip { .. } => {}
        }
    }

    // trailing implicit matches
    copy_from_reference(&mut buf[read_position..], reference_position)?;

    Ok(buf)
}

fn write_bases(
    buf: &mut [u8],
    read_position: usize,
    bases: &[u8],
    read_length: usize,
) -> Result<()> {
    let end = read_position + bases.len();

    if end > read_length {
        return Err(Error::RecordValidation(format!(
            "feature runs past the read end: {end} > {read_length}"
        )));
    }

    buf[read_position..end].copy_from_slice(bases);

    Ok(())
}

/// Restores quality scores from per-feature scores.
///
/// Used when scores were not preserved as an array; positions without a
/// score feature stay at the missing sentinel (0xff).
pub(crate) fn resolve_quality_scores(features: &[Feature], read_length: usize) -> Vec<u8> {
    let mut buf = vec![0xff; read_length];

    for feature in features {
        let position = usize::from(feature.position()) - 1;

        match feature {
            Feature::ReadBase { quality_score, .. } | Feature::QualityScore { quality_score, .. } => {
                if let Some(b) = buf.get_mut(position) {
                    *b = *quality_score;
                }
            }
            Feature::Scores { quality_scores, .. } => {
                let end = (position + quality_scores.len()).min(read_length);

                if position < end {
                    buf[position..end].copy_from_slice(&quality_scores[..end - position]);
                }
            }
            _ => {}
        }
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_resolve_bases_with_no_features() -> Result<()> {
        let reference = b"ACGTACGT";
        let matrix = SubstitutionMatrix::default();

        let bases = resolve_bases(Some(reference), &matrix, &[], position(2), 4)?;
        assert_eq!(bases, b"CGTA");

        Ok(())
    }

    #[test]
    fn test_resolve_bases_with_substitution() -> Result<()> {
        let reference = b"ACGTACGT";
        let matrix = SubstitutionMatrix::default();

        // reference base at read position 2 is 'C'; code 2 maps C -> T
        let features = [Feature::Substitution {
            position: position(2),
            value: substitution::Value::Code(2),
        }];

        let bases = resolve_bases(Some(reference), &matrix, &features, position(1), 4)?;
        assert_eq!(bases, b"ATGT");

        Ok(())
    }

    #[test]
    fn test_resolve_bases_with_indels() -> Result<()> {
        let reference = b"ACGTACGT";
        let matrix = SubstitutionMatrix::default();

        let features = [
            Feature::Insertion {
                position: position(2),
                bases: b"GG".to_vec(),
            },
            Feature::Deletion {
                position: position(5),
                len: 2,
            },
        ];

        // read: A GG C [del GT] A C
        let bases = resolve_bases(Some(reference), &matrix, &features, position(1), 6)?;
        assert_eq!(bases, b"AGGCAC");

        Ok(())
    }

    #[test]
    fn test_resolve_bases_with_soft_clip() -> Result<()> {
        let reference = b"ACGTACGT";
        let matrix = SubstitutionMatrix::default();

        let features = [Feature::SoftClip {
            position: position(1),
            bases: b"TT".to_vec(),
        }];

        let bases = resolve_bases(Some(reference), &matrix, &features, position(3), 5)?;
        assert_eq!(bases, b"TTGTA");

        Ok(())
    }

    #[test]
    fn test_resolve_bases_without_reference() {
        let matrix = SubstitutionMatrix::default();

        assert!(matches!(
            resolve_bases(None, &matrix, &[], position(1), 4),
            Err(Error::Malformed(_))
        ));

        // full coverage by a base stretch needs no reference
        let features = [Feature::Bases {
            position: position(1),
            bases: b"ACGT".to_vec(),
        }];

        let bases = resolve_bases(None, &matrix, &features, position(1), 4).unwrap();
        assert_eq!(bases, b"ACGT");
    }

    #[test]
    fn test_resolve_bases_with_out_of_range_feature() {
        let reference = b"ACGTACGT";
        let matrix = SubstitutionMatrix::default();

        let features = [Feature::InsertBase {
            position: position(9),
            base: b'A',
        }];

        assert!(matches!(
            resolve_bases(Some(reference), &matrix, &features, position(1), 4),
            Err(Error::RecordValidation(_))
        ));
    }

    #[test]
    fn test_resolve_quality_scores() {
        let features = [
            Feature::ReadBase {
                position: position(1),
                base: b'A',
                quality_score: 45,
            },
            Feature::Scores {
                position: position(3),
                quality_scores: vec![35, 43],
            },
        ];

        assert_eq!(resolve_quality_scores(&features, 4), [45, 0xff, 35, 43]);
    }
}
