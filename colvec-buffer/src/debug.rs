use std::fmt::{Debug, Formatter};

const PREVIEW_BYTES: usize = 32;

/// Renders the leading bytes of a buffer as hex, eliding the rest.
pub(crate) struct HexPreview<'a>(pub(crate) &'a [u8]);

impl Debug for HexPreview<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, byte) in self.0.iter().take(PREVIEW_BYTES).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        if self.0.len() > PREVIEW_BYTES {
            write!(f, " .. +{}", self.0.len() - PREVIEW_BYTES)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_buffers_are_elided() {
        assert_eq!(format!("{:?}", HexPreview(&[0x0a, 0xff])), "[0a ff]");
        let long = [1u8; 40];
        assert!(format!("{:?}", HexPreview(&long)).ends_with("01 .. +8]"));
    }
}
