use bitflags::bitflags;

bitflags! {
    /// CRAM record flags.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Flags: u8 {
        /// Quality scores are stored as a per-base array rather than as read
        /// features.
        const QUALITY_SCORES_ARE_STORED_AS_ARRAY = 0x01;
        /// The mate is not in this slice; mate fields are stored verbatim.
        const IS_DETACHED = 0x02;
        /// The mate is a later record in this slice.
        const MATE_IS_DOWNSTREAM = 0x04;
        /// The sequence is unknown ("*").
        const SEQUENCE_IS_MISSING = 0x08;
    }
}

impl Flags {
    pub fn quality_scores_are_stored_as_array(self) -> bool {
        self.contains(Self::QUALITY_SCORES_ARE_STORED_AS_ARRAY)
    }

    pub fn is_detached(self) -> bool {
        self.contains(Self::IS_DETACHED)
    }

    pub fn has_mate_downstream(self) -> bool {
        self.contains(Self::MATE_IS_DOWNSTREAM)
    }

    pub fn sequence_is_missing(self) -> bool {
        self.contains(Self::SEQUENCE_IS_MISSING)
    }
}

impl From<u8> for Flags {
    fn from(value: u8) -> Self {
        Self::from_bits_retain(value)
    }
}

impl From<Flags> for u8 {
    fn from(flags: Flags) -> Self {
        flags.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(
            Flags::from(0x06),
            Flags::IS_DETACHED | Flags::MATE_IS_DOWNSTREAM
        );
        assert_eq!(u8::from(Flags::SEQUENCE_IS_MISSING), 0x08);
    }
}
