use bitflags::bitflags;

bitflags! {
    /// SAM record flags.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Flags: u16 {
        /// The read is segmented (paired).
        const SEGMENTED = 0x01;
        /// Each segment is properly aligned.
        const PROPERLY_SEGMENTED = 0x02;
        /// The segment is unmapped.
        const UNMAPPED = 0x04;
        /// The mate is unmapped.
        const MATE_UNMAPPED = 0x08;
        /// The sequence is reverse complemented.
        const REVERSE_COMPLEMENTED = 0x10;
        /// The mate sequence is reverse complemented.
        const MATE_REVERSE_COMPLEMENTED = 0x20;
        /// This is the first segment in the template.
        const FIRST_SEGMENT = 0x40;
        /// This is the last segment in the template.
        const LAST_SEGMENT = 0x80;
        /// This is a secondary alignment.
        const SECONDARY = 0x100;
        /// The read failed quality checks.
        const QC_FAIL = 0x200;
        /// The read is a PCR or optical duplicate.
        const DUPLICATE = 0x400;
        /// This is a supplementary alignment.
        const SUPPLEMENTARY = 0x800;
    }
}

impl Flags {
    pub fn is_segmented(self) -> bool {
        self.contains(Self::SEGMENTED)
    }

    pub fn is_unmapped(self) -> bool {
        self.contains(Self::UNMAPPED)
    }

    pub fn is_mate_unmapped(self) -> bool {
        self.contains(Self::MATE_UNMAPPED)
    }

    pub fn is_reverse_complemented(self) -> bool {
        self.contains(Self::REVERSE_COMPLEMENTED)
    }

    pub fn is_mate_reverse_complemented(self) -> bool {
        self.contains(Self::MATE_REVERSE_COMPLEMENTED)
    }

    pub fn is_secondary(self) -> bool {
        self.contains(Self::SECONDARY)
    }

    pub fn is_supplementary(self) -> bool {
        self.contains(Self::SUPPLEMENTARY)
    }
}

impl From<u16> for Flags {
    fn from(value: u16) -> Self {
        Self::from_bits_retain(value)
    }
}

impl From<Flags> for u16 {
    fn from(flags: Flags) -> Self {
        flags.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Flags::from(0x05), Flags::SEGMENTED | Flags::UNMAPPED);
        assert_eq!(u16::from(Flags::SEGMENTED | Flags::UNMAPPED), 0x05);
    }

    #[test]
    fn test_predicates() {
        assert!(Flags::UNMAPPED.is_unmapped());
        assert!(!Flags::UNMAPPED.is_segmented());
        assert!(Flags::MATE_REVERSE_COMPLEMENTED.is_mate_reverse_complemented());
    }
}
