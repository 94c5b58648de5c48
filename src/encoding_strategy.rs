use std::{fs::File, io::BufReader, path::Path};

use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::{
    codecs::{rans_4x8, Encoder},
    container::{compression_header::DataSeries, BlockContentEncoderMap},
    io::writer::Options,
    Error, Result,
};

fn default_version() -> u32 {
    1
}

fn default_gzip_compression_level() -> u32 {
    6
}

fn default_records_per_slice() -> usize {
    10_000
}

fn default_slices_per_container() -> usize {
    1
}

fn default_min_single_reference_records() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

/// Write-side tuning knobs, JSON-persisted so a pipeline can pin an
/// encoding strategy across runs.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncodingStrategy {
    /// The strategy format version.
    pub version: u32,
    /// The gzip level used for gzip-compressed blocks, in `[0, 10]`.
    pub gzip_compression_level: u32,
    /// The number of records per slice.
    pub records_per_slice: usize,
    /// The number of slices per container.
    pub slices_per_container: usize,
    /// The single-reference run length below which a reference switch
    /// coalesces into a multi-reference slice.
    pub min_single_reference_records: usize,
    /// Whether read names are preserved.
    pub preserve_read_names: bool,
    /// Whether reference subsequences are embedded into slices.
    pub embed_reference: bool,
    /// Whether read bases are stored verbatim instead of
    /// reference-compressed.
    pub embed_bases: bool,
    /// An optional path to a JSON-serialized custom block compressor map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_compression_map_path: Option<std::path::PathBuf>,
}

impl Default for EncodingStrategy {
    fn default() -> Self {
        Self {
            version: default_version(),
            gzip_compression_level: default_gzip_compression_level(),
            records_per_slice: default_records_per_slice(),
            slices_per_container: default_slices_per_container(),
            min_single_reference_records: default_min_single_reference_records(),
            preserve_read_names: default_true(),
            embed_reference: false,
            embed_bases: false,
            custom_compression_map_path: None,
        }
    }
}

impl EncodingStrategy {
    /// Reads a JSON-persisted strategy.
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let reader = File::open(path).map(BufReader::new)?;

        let strategy: Self = serde_json::from_reader(reader)
            .map_err(|e| Error::malformed(format!("invalid encoding strategy: {e}")))?;

        strategy.validate()?;

        Ok(strategy)
    }

    /// Persists the strategy as JSON.
    pub fn to_path<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        self.validate()?;

        let writer = File::create(path)?;

        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| Error::invalid_state(format!("cannot serialize strategy: {e}")))?;

        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.gzip_compression_level > 10 {
            return Err(Error::invalid_state(
                "gzip compression level must be in [0, 10]",
            ));
        }

        if self.records_per_slice == 0 {
            return Err(Error::invalid_state("records_per_slice must be > 0"));
        }

        if self.slices_per_container == 0 {
            return Err(Error::invalid_state("slices_per_container must be > 0"));
        }

        Ok(())
    }

    pub(crate) fn to_options(&self) -> Result<Options> {
        self.validate()?;

        // flate2 levels top out at 9
        let gzip_level = Compression::new(self.gzip_compression_level.min(9));

        let block_content_encoder_map = match &self.custom_compression_map_path {
            Some(path) => load_compression_map(path, gzip_level)?,
            None => BlockContentEncoderMap::with_gzip_level(gzip_level),
        };

        Ok(Options {
            preserve_read_names: self.preserve_read_names,
            encode_alignment_start_positions_as_deltas: true,
            block_content_encoder_map,
            records_per_slice: self.records_per_slice,
            slices_per_container: self.slices_per_container,
            min_single_reference_records: self.min_single_reference_records,
            embed_reference_sequences: self.embed_reference,
            embed_bases: self.embed_bases,
            reference_required: !self.embed_bases,
        })
    }
}

/// One compressor assignment in a custom compression map file.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompressorSpec {
    method: String,
    #[serde(default)]
    level: Option<u32>,
    #[serde(default)]
    order: Option<u8>,
}

impl CompressorSpec {
    fn to_encoder(&self, default_gzip: Compression) -> Result<Option<Encoder>> {
        match self.method.as_str() {
            "raw" => Ok(None),
            "gzip" => Ok(Some(Encoder::Gzip(
                self.level.map(Compression::new).unwrap_or(default_gzip),
            ))),
            "bzip2" => Ok(Some(Encoder::Bzip2(
                self.level
                    .map(bzip2::Compression::new)
                    .unwrap_or_else(bzip2::Compression::default),
            ))),
            "lzma" => Ok(Some(Encoder::Lzma(self.level.unwrap_or(6)))),
            "rans4x8" => {
                let order = match self.order.unwrap_or(0) {
                    0 => rans_4x8::Order::Zero,
                    1 => rans_4x8::Order::One,
                    n => {
                        return Err(Error::invalid_state(format!(
                            "invalid rANS order: {n}"
                        )));
                    }
                };

                Ok(Some(Encoder::Rans4x8(order)))
            }
            method => Err(Error::invalid_state(format!(
                "unknown compression method: {method}"
            ))),
        }
    }
}

/// Loads a custom block compressor map: a JSON object from two-letter data
/// series names (plus `"core"`) to compressor specs.
fn load_compression_map<P>(path: P, default_gzip: Compression) -> Result<BlockContentEncoderMap>
where
    P: AsRef<Path>,
{
    use std::collections::HashMap;

    let reader = File::open(path).map(BufReader::new)?;

    let specs: HashMap<String, CompressorSpec> = serde_json::from_reader(reader)
        .map_err(|e| Error::malformed(format!("invalid compression map: {e}")))?;

    let mut map = BlockContentEncoderMap::with_gzip_level(default_gzip);

    for (name, spec) in &specs {
        let encoder = spec.to_encoder(default_gzip)?;

        if name == "core" {
            map.set_core_data_encoder(encoder);
            continue;
        }

        let key: [u8; 2] = name
            .as_bytes()
            .try_into()
            .map_err(|_| Error::malformed(format!("invalid data series name: {name}")))?;

        let data_series = DataSeries::try_from(key)
            .map_err(|_| Error::malformed(format!("invalid data series name: {name}")))?;

        map.set_data_series_encoder(crate::container::block::ContentId::from(data_series), encoder);
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let strategy = EncodingStrategy::default();

        assert_eq!(strategy.records_per_slice, 10_000);
        assert_eq!(strategy.slices_per_container, 1);
        assert!(strategy.preserve_read_names);
        assert!(!strategy.embed_reference);
    }

    #[test]
    fn test_json_round_trip() -> Result<()> {
        let strategy = EncodingStrategy {
            gzip_compression_level: 4,
            records_per_slice: 500,
            ..Default::default()
        };

        let json = serde_json::to_string(&strategy).unwrap();
        let decoded: EncodingStrategy = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, strategy);

        Ok(())
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let decoded: EncodingStrategy = serde_json::from_str("{}").unwrap();
        assert_eq!(decoded, EncodingStrategy::default());
    }

    #[test]
    fn test_validate() {
        let mut strategy = EncodingStrategy::default();
        assert!(strategy.validate().is_ok());

        strategy.gzip_compression_level = 11;
        assert!(strategy.validate().is_err());

        strategy.gzip_compression_level = 6;
        strategy.records_per_slice = 0;
        assert!(strategy.validate().is_err());
    }
}
