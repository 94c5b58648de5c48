//! Conversions between alignment records and CRAM records.

use tracing::warn;

use super::{feature::substitution, Feature, Flags, MateFlags, Record};
use crate::{
    alignment::{
        cigar::Kind,
        record::RecordBuf,
        Cigar,
    },
    container::compression_header::preservation_map::substitution_matrix::Base,
    Error, Position, Result,
};

/// Write-side conversion options.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ConvertOptions {
    /// Store mapped read bases verbatim instead of substitution-coding them
    /// against the reference.
    pub embed_bases: bool,
}

impl Record {
    /// Builds a CRAM record from an alignment record.
    ///
    /// `reference_sequence` is the full sequence of the reference the record
    /// is placed on; it is required to derive substitution features unless
    /// bases are embedded.
    pub(crate) fn try_from_alignment_record(
        record: &RecordBuf,
        reference_sequence: Option<&[u8]>,
        options: ConvertOptions,
    ) -> Result<Self> {
        let bam_flags = record.flags;
        let mut cram_flags = Flags::default();

        let sequence = normalize_bases(&record.sequence);
        let read_length = sequence.len();

        if sequence.is_empty() {
            cram_flags.insert(Flags::SEQUENCE_IS_MISSING);
        }

        if !record.quality_scores.is_empty() {
            if record.quality_scores.len() != read_length {
                return Err(Error::RecordValidation(format!(
                    "quality score length {} does not match read length {read_length}",
                    record.quality_scores.len()
                )));
            }

            cram_flags.insert(Flags::QUALITY_SCORES_ARE_STORED_AS_ARRAY);
        }

        if !bam_flags.is_unmapped() && record.alignment_start.is_none() {
            // abnormal but legal; see § 10.2 on placement
            warn!(
                "record {:?} appears mapped but has no valid alignment start",
                record.name
            );
        }

        let features = if bam_flags.is_unmapped() || sequence.is_empty() {
            Vec::new()
        } else {
            build_features(
                &record.cigar,
                &sequence,
                record.alignment_start,
                reference_sequence,
                options,
            )?
        };

        let mut mate_flags = MateFlags::default();

        if bam_flags.is_mate_unmapped() {
            mate_flags.insert(MateFlags::IS_UNMAPPED);
        }

        if bam_flags.is_mate_reverse_complemented() {
            mate_flags.insert(MateFlags::ON_NEGATIVE_STRAND);
        }

        Ok(Self {
            id: 0,
            name: record.name.clone(),
            bam_flags,
            cram_flags,
            reference_sequence_id: record.reference_sequence_id,
            read_length,
            alignment_start: record.alignment_start,
            read_group_id: record.read_group_id,
            mate_flags,
            mate_reference_sequence_id: record.mate_reference_sequence_id,
            mate_alignment_start: record.mate_alignment_start,
            template_length: record.template_length,
            mate_distance: None,
            data: record.data.clone(),
            features,
            mapping_quality: record.mapping_quality,
            sequence,
            quality_scores: record.quality_scores.clone(),
            next_mate_index: None,
            previous_mate_index: None,
        })
    }

    /// Converts this record into an alignment record, materializing the
    /// CIGAR from the read features.
    pub fn try_into_alignment_record(&self) -> Result<RecordBuf> {
        Ok(RecordBuf {
            name: self.name.clone(),
            flags: self.bam_flags,
            reference_sequence_id: self.reference_sequence_id,
            alignment_start: self.alignment_start,
            mapping_quality: self.mapping_quality,
            cigar: self.cigar(),
            mate_reference_sequence_id: self.mate_reference_sequence_id,
            mate_alignment_start: self.mate_alignment_start,
            template_length: self.template_length,
            sequence: self.sequence.clone(),
            quality_scores: self.quality_scores.clone(),
            read_group_id: self.read_group_id,
            data: self.data.clone(),
        })
    }
}

/// Normalizes read bases to the ACGTN alphabet, uppercased.
///
/// CRAM read bases are limited to ACGTN; other IUPAC codes collapse to N.
fn normalize_bases(src: &[u8]) -> Vec<u8> {
    src.iter()
        .map(|&b| match b.to_ascii_uppercase() {
            b @ (b'A' | b'C' | b'G' | b'T' | b'N') => b,
            _ => b'N',
        })
        .collect()
}

/// Walks the CIGAR, emitting the feature edit script.
///
/// Match runs are compared base-by-base against the reference: mismatches
/// within the substitution alphabet become substitution features carrying
/// the observed base pair; anything else becomes a verbatim read base. With
/// `embed_bases` (or no reference), match runs are stored as base stretches
/// and the reference is never consulted.
fn build_features(
    cigar: &Cigar,
    sequence: &[u8],
    alignment_start: Option<Position>,
    reference_sequence: Option<&[u8]>,
    options: ConvertOptions,
) -> Result<Vec<Feature>> {
    let mut features = Vec::new();

    if cigar.read_length() != sequence.len() {
        return Err(Error::RecordValidation(format!(
            "CIGAR covers {} bases, read has {}",
            cigar.read_length(),
            sequence.len()
        )));
    }

    let embed_bases = options.embed_bases || reference_sequence.is_none();

    // 0-based cursors
    let mut read_position = 0;
    let mut reference_position = match alignment_start {
        Some(start) => usize::from(start) - 1,
        None if embed_bases => 0,
        None => {
            return Err(Error::RecordValidation(
                "mapped record has no alignment start".into(),
            ));
        }
    };

    for op in cigar.iter() {
        let len = op.len();

        let position = Position::new(read_position + 1)
            .ok_or_else(|| Error::invalid_state("read position overflow"))?;

        match op.kind() {
            Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                if embed_bases {
                    features.push(Feature::Bases {
                        position,
                        bases: sequence[read_position..read_position + len].to_vec(),
                    });
                } else {
                    let reference_sequence =
                        reference_sequence.expect("reference checked above");

                    push_match_features(
                        &mut features,
                        sequence,
                        read_position,
                        reference_sequence,
                        reference_position,
                        len,
                    )?;
                }
            }
            Kind::Insertion => {
                if len == 1 {
                    features.push(Feature::InsertBase {
                        position,
                        base: sequence[read_position],
                    });
                } else {
                    features.push(Feature::Insertion {
                        position,
                        bases: sequence[read_position..read_position + len].to_vec(),
                    });
                }
            }
            Kind::Deletion => features.push(Feature::Deletion { position, len }),
            Kind::Skip => features.push(Feature::ReferenceSkip { position, len }),
            Kind::SoftClip => features.push(Feature::SoftClip {
                position,
                bases: sequence[read_position..read_position + len].to_vec(),
            }),
            Kind::HardClip => features.push(Feature::HardClip { position, len }),
            Kind::Pad => features.push(Feature::Padding { position, len }),
        }

        if op.kind().consumes_read() {
            read_position += len;
        }

        if op.kind().consumes_reference() {
            reference_position += len;
        }
    }

    Ok(features)
}

fn push_match_features(
    features: &mut Vec<Feature>,
    sequence: &[u8],
    read_position: usize,
    reference_sequence: &[u8],
    reference_position: usize,
    len: usize,
) -> Result<()> {
    for i in 0..len {
        let read_base = sequence[read_position + i];

        let reference_base = reference_sequence
            .get(reference_position + i)
            .copied()
            .ok_or_else(|| {
                Error::malformed(format!(
                    "alignment runs off the reference: position {}",
                    reference_position + i + 1
                ))
            })?
            .to_ascii_uppercase();

        if read_base == reference_base {
            continue;
        }

        let position = Position::new(read_position + i + 1)
            .ok_or_else(|| Error::invalid_state("read position overflow"))?;

        match (
            Base::try_from(reference_base),
            Base::try_from(read_base),
        ) {
            (Ok(reference_base), Ok(read_base)) => {
                features.push(Feature::Substitution {
                    position,
                    value: substitution::Value::Bases(reference_base, read_base),
                });
            }
            // outside the substitution alphabet: store the base verbatim
            _ => features.push(Feature::ReadBase {
                position,
                base: read_base,
                quality_score: 0xff,
            }),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{cigar::Op, Flags as BamFlags};

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_build_features_with_perfect_match() -> Result<()> {
        let cigar: Cigar = [Op::new(Kind::Match, 4)].into_iter().collect();
        let reference = b"ACGTACGT";

        let features = build_features(
            &cigar,
            b"ACGT",
            Some(position(1)),
            Some(reference),
            ConvertOptions::default(),
        )?;

        assert!(features.is_empty());

        Ok(())
    }

    #[test]
    fn test_build_features_with_mismatch() -> Result<()> {
        let cigar: Cigar = [Op::new(Kind::Match, 4)].into_iter().collect();
        let reference = b"ACGTACGT";

        let features = build_features(
            &cigar,
            b"ATGT",
            Some(position(1)),
            Some(reference),
            ConvertOptions::default(),
        )?;

        assert_eq!(
            features,
            [Feature::Substitution {
                position: position(2),
                value: substitution::Value::Bases(Base::C, Base::T),
            }]
        );

        Ok(())
    }

    #[test]
    fn test_build_features_with_clips_and_indels() -> Result<()> {
        let cigar: Cigar = [
            Op::new(Kind::SoftClip, 2),
            Op::new(Kind::Match, 2),
            Op::new(Kind::Insertion, 1),
            Op::new(Kind::Deletion, 3),
            Op::new(Kind::Match, 2),
            Op::new(Kind::HardClip, 4),
        ]
        .into_iter()
        .collect();

        let reference = b"ACGTACGTAC";

        // softclip TT; match AC at ref 1..=2; insert G; delete GTA; match CG
        let features = build_features(
            &cigar,
            b"TTACGCG",
            Some(position(1)),
            Some(reference),
            ConvertOptions::default(),
        )?;

        assert_eq!(
            features,
            [
                Feature::SoftClip {
                    position: position(1),
                    bases: b"TT".to_vec(),
                },
                Feature::InsertBase {
                    position: position(5),
                    base: b'G',
                },
                Feature::Deletion {
                    position: position(6),
                    len: 3,
                },
                Feature::HardClip {
                    position: position(8),
                    len: 4,
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn test_build_features_with_embedded_bases() -> Result<()> {
        let cigar: Cigar = [Op::new(Kind::Match, 4)].into_iter().collect();

        let features = build_features(
            &cigar,
            b"ACGT",
            Some(position(1)),
            None,
            ConvertOptions::default(),
        )?;

        assert_eq!(
            features,
            [Feature::Bases {
                position: position(1),
                bases: b"ACGT".to_vec(),
            }]
        );

        Ok(())
    }

    #[test]
    fn test_try_from_alignment_record_round_trips_cigar() -> Result<()> {
        let record = RecordBuf {
            flags: BamFlags::empty(),
            reference_sequence_id: Some(0),
            alignment_start: Some(position(1)),
            cigar: [Op::new(Kind::SoftClip, 1), Op::new(Kind::Match, 3)]
                .into_iter()
                .collect(),
            sequence: b"TACG".to_vec(),
            quality_scores: vec![40, 35, 30, 25],
            ..Default::default()
        };

        let reference = b"ACGTACGT";

        let cram_record = Record::try_from_alignment_record(
            &record,
            Some(&reference[..]),
            ConvertOptions::default(),
        )?;

        assert_eq!(cram_record.cigar().to_string(), "1S3M");
        assert!(cram_record
            .cram_flags()
            .quality_scores_are_stored_as_array());

        Ok(())
    }

    #[test]
    fn test_normalize_bases() {
        assert_eq!(normalize_bases(b"acgtn"), b"ACGTN");
        assert_eq!(normalize_bases(b"ARSW"), b"ANNN");
    }
}
