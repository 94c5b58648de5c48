//! Index derivation integration tests.

use std::io::Cursor;

use hts_cram::{
    alignment::{
        cigar::{Kind, Op},
        Flags, MappingQuality, RecordBuf,
    },
    crai, fs,
    io::writer,
    InMemoryReferenceSource, Position,
};

const SAM_HEADER: &[u8] = b"@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:64\n";

fn reference_source() -> InMemoryReferenceSource {
    InMemoryReferenceSource::from([
        b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT".to_vec(),
        b"TTTTCCCCGGGGAAAATTTTCCCCGGGGAAAATTTTCCCCGGGGAAAATTTTCCCCGGGGAAAA".to_vec(),
    ])
}

fn mapped_record(name: &str, reference_sequence_id: usize, start: usize) -> RecordBuf {
    RecordBuf {
        name: Some(name.into()),
        flags: Flags::empty(),
        reference_sequence_id: Some(reference_sequence_id),
        alignment_start: Position::new(start),
        mapping_quality: MappingQuality::new(30),
        cigar: [Op::new(Kind::Match, 4)].into_iter().collect(),
        sequence: match reference_sequence_id {
            0 => b"ACGT".to_vec(),
            _ => b"TTTT".to_vec(),
        },
        quality_scores: vec![35; 4],
        ..Default::default()
    }
}

fn write_stream(records: &[RecordBuf], records_per_slice: usize) -> (Vec<u8>, Vec<crai::Entry>) {
    let mut buf = Vec::new();

    let entries = {
        let mut writer = writer::Builder::default()
            .set_reference_source(reference_source())
            .set_records_per_slice(records_per_slice)
            .set_min_single_reference_records(1)
            .build_from_writer(&mut buf);

        writer.write_file_definition().unwrap();
        writer.write_file_header(SAM_HEADER).unwrap();

        for record in records {
            writer.write_record(record).unwrap();
        }

        writer.finish().unwrap();
        writer.index_entries().to_vec()
    };

    (buf, entries)
}

#[test]
fn test_writer_emits_index_entries() {
    let records = vec![
        mapped_record("r1", 0, 1),
        mapped_record("r2", 0, 9),
        mapped_record("r3", 0, 17),
    ];

    let (_, entries) = write_stream(&records, 2);

    // two slices: records [r1, r2] and [r3]
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].reference_sequence_id(), Some(0));
    assert_eq!(entries[0].alignment_start(), Position::new(1));
    assert_eq!(entries[0].alignment_span(), 12);

    assert_eq!(entries[1].reference_sequence_id(), Some(0));
    assert_eq!(entries[1].alignment_start(), Position::new(17));
    assert_eq!(entries[1].alignment_span(), 4);

    assert!(entries[1].container_offset() > entries[0].container_offset());
}

#[test]
fn test_fs_index_matches_writer_entries() {
    let records = vec![
        mapped_record("r1", 0, 1),
        mapped_record("r2", 0, 9),
        mapped_record("r3", 1, 1),
    ];

    let (stream, mut writer_entries) = write_stream(&records, 10);

    let index = fs::index_from_reader(Cursor::new(&stream[..])).unwrap();

    writer_entries.sort();
    assert_eq!(index, writer_entries);
}

#[test]
fn test_crai_serialization_round_trips() {
    let records = vec![mapped_record("r1", 0, 1), mapped_record("r2", 1, 5)];

    let (stream, _) = write_stream(&records, 10);
    let index = fs::index_from_reader(Cursor::new(&stream[..])).unwrap();

    let mut buf = Vec::new();
    crai::io::write_index(&mut buf, &index).unwrap();

    let decoded = crai::io::read_index(&buf[..]).unwrap();
    assert_eq!(decoded, index);
}
