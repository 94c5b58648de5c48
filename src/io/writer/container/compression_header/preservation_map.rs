use std::io::Write;

use crate::{
    container::compression_header::preservation_map::{
        tag_sets, Key, PreservationMap, SubstitutionMatrix, TagSets,
    },
    io::writer::{
        collections::write_array,
        num::{write_itf8, write_u8},
        Options,
    },
    record::{feature::substitution, Feature},
    Record, Result,
};

pub(super) fn build_preservation_map<'a, I>(options: &Options, records: I) -> PreservationMap
where
    I: Iterator<Item = &'a Record> + Clone,
{
    PreservationMap::new(
        options.preserve_read_names,
        options.encode_alignment_start_positions_as_deltas,
        options.reference_required
            && !options.embed_reference_sequences
            && !options.embed_bases,
        build_substitution_matrix(records.clone()),
        build_tag_sets(records),
    )
}

/// Ranks substitute bases by the frequencies observed across the
/// container's substitution features.
fn build_substitution_matrix<'a, I>(records: I) -> SubstitutionMatrix
where
    I: Iterator<Item = &'a Record>,
{
    let mut frequencies = [[0u64; 5]; 5];

    for record in records {
        for feature in record.features() {
            if let Feature::Substitution {
                value: substitution::Value::Bases(reference_base, read_base),
                ..
            } = feature
            {
                frequencies[base_index(*reference_base)][base_index(*read_base)] += 1;
            }
        }
    }

    SubstitutionMatrix::from_frequencies(frequencies)
}

fn base_index(base: substitution::Base) -> usize {
    match base {
        substitution::Base::A => 0,
        substitution::Base::C => 1,
        substitution::Base::G => 2,
        substitution::Base::T => 3,
        substitution::Base::N => 4,
    }
}

/// Collects the distinct ordered tag key sets present on the container's
/// records, in first-appearance order.
fn build_tag_sets<'a, I>(records: I) -> TagSets
where
    I: Iterator<Item = &'a Record>,
{
    let mut tag_sets = TagSets::new();

    for record in records {
        let keys: Vec<tag_sets::Key> = record
            .data()
            .iter()
            .map(|(tag, value)| tag_sets::Key::new(*tag, value.ty()))
            .collect();

        if !tag_sets.contains(&keys) {
            tag_sets.push(keys);
        }
    }

    tag_sets
}

pub(super) fn write_preservation_map<W>(
    writer: &mut W,
    preservation_map: &PreservationMap,
) -> Result<()>
where
    W: Write,
{
    let mut buf = Vec::new();
    encode_inner(&mut buf, preservation_map)?;
    write_array(writer, &buf)?;
    Ok(())
}

fn encode_inner<W>(writer: &mut W, preservation_map: &PreservationMap) -> Result<()>
where
    W: Write,
{
    const MAP_LENGTH: i32 = 5;

    write_itf8(writer, MAP_LENGTH)?;

    write_key(writer, Key::RecordsHaveNames)?;
    write_bool(writer, preservation_map.records_have_names())?;

    write_key(writer, Key::AlignmentStartsAreDeltas)?;
    write_bool(writer, preservation_map.alignment_starts_are_deltas())?;

    write_key(writer, Key::ExternalReferenceSequenceIsRequired)?;
    write_bool(
        writer,
        preservation_map.external_reference_sequence_is_required(),
    )?;

    write_key(writer, Key::SubstitutionMatrix)?;
    let matrix = <[u8; 5]>::from(preservation_map.substitution_matrix());
    writer.write_all(&matrix).map_err(crate::Error::from)?;

    write_key(writer, Key::TagSets)?;
    write_tag_sets(writer, preservation_map.tag_sets())?;

    Ok(())
}

fn write_key<W>(writer: &mut W, key: Key) -> Result<()>
where
    W: Write,
{
    let data = <[u8; 2]>::from(key);
    writer.write_all(&data).map_err(crate::Error::from)
}

fn write_bool<W>(writer: &mut W, value: bool) -> Result<()>
where
    W: Write,
{
    write_u8(writer, if value { 0x01 } else { 0x00 })?;
    Ok(())
}

fn write_tag_sets<W>(writer: &mut W, tag_sets: &TagSets) -> Result<()>
where
    W: Write,
{
    let mut buf = Vec::new();

    for keys in tag_sets {
        for key in keys {
            let [b0, b1] = key.tag().as_array();
            buf.push(b0);
            buf.push(b1);
            buf.push(u8::from(key.ty()));
        }

        buf.push(0x00);
    }

    write_array(writer, &buf)?;
    Ok(())
}
