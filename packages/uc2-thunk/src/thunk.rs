//! The adapter record: a Unicode Collation 2 interface backed by a legacy
//! Unicode Collation instance.

use std::fmt;
use std::sync::Arc;

use efi_collation::{LanguageBuffer, UnicodeCollation, UnicodeCollation2};

use crate::{Result, ThunkError};

/// Build a firmware signature from four ASCII bytes, lowest byte first.
pub const fn signature_32(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) | (b as u32) << 8 | (c as u32) << 16 | (d as u32) << 24
}

/// Signature carried by every adapter record.
pub const UC2_THUNK_SIGNATURE: u32 = signature_32(b'_', b'U', b'C', b'2');

/// Immutable prototype every adapter record is copied from: signature preset,
/// legacy interface unset, no language list.
pub static UC2_THUNK_TEMPLATE: PendingThunk = PendingThunk {
    signature: UC2_THUNK_SIGNATURE,
    legacy: None,
    languages: None,
};

/// An adapter record that is still being filled in.
///
/// Obtained by copying [`UC2_THUNK_TEMPLATE`] out of a
/// [`MemoryPool`](crate::MemoryPool), then turned into a [`Uc2Thunk`] with
/// [`seal`](Self::seal).
#[derive(Clone)]
pub struct PendingThunk {
    signature: u32,
    legacy: Option<Arc<dyn UnicodeCollation>>,
    languages: Option<LanguageBuffer>,
}

impl PendingThunk {
    /// Record signature.
    pub fn signature(&self) -> u32 {
        self.signature
    }

    /// The wrapped legacy interface, once attached.
    pub fn legacy(&self) -> Option<&Arc<dyn UnicodeCollation>> {
        self.legacy.as_ref()
    }

    /// Attach the legacy interface the record forwards to.
    pub fn attach_legacy(&mut self, legacy: Arc<dyn UnicodeCollation>) {
        self.legacy = Some(legacy);
    }

    /// Attach the converted language list.
    pub fn attach_languages(&mut self, languages: LanguageBuffer) {
        self.languages = Some(languages);
    }

    /// Finish the record. Fails if a field was never attached.
    pub fn seal(self) -> Result<Uc2Thunk> {
        let legacy = self.legacy.ok_or(ThunkError::Incomplete { missing: "legacy" })?;
        let languages = self.languages.ok_or(ThunkError::Incomplete {
            missing: "languages",
        })?;
        Ok(Uc2Thunk {
            signature: self.signature,
            legacy,
            languages,
        })
    }
}

impl fmt::Debug for PendingThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingThunk")
            .field("signature", &format_args!("{:#010x}", self.signature))
            .field("legacy", &self.legacy.is_some())
            .field("languages", &self.languages)
            .finish()
    }
}

/// A published adapter record.
///
/// Every collation operation goes straight to the wrapped legacy instance and
/// its result is returned unchanged. Only the language list is the thunk's own.
pub struct Uc2Thunk {
    signature: u32,
    legacy: Arc<dyn UnicodeCollation>,
    languages: LanguageBuffer,
}

impl Uc2Thunk {
    /// Record signature, always [`UC2_THUNK_SIGNATURE`].
    pub fn signature(&self) -> u32 {
        self.signature
    }

    /// The wrapped legacy interface.
    pub fn legacy(&self) -> &Arc<dyn UnicodeCollation> {
        &self.legacy
    }
}

impl fmt::Debug for Uc2Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uc2Thunk")
            .field("signature", &format_args!("{:#010x}", self.signature))
            .field("languages", &self.languages.as_str())
            .finish_non_exhaustive()
    }
}

impl UnicodeCollation2 for Uc2Thunk {
    fn stri_coll(&self, s1: &[u16], s2: &[u16]) -> isize {
        self.legacy.stri_coll(s1, s2)
    }

    fn metai_match(&self, string: &[u16], pattern: &[u16]) -> bool {
        self.legacy.metai_match(string, pattern)
    }

    fn str_lwr(&self, string: &mut [u16]) {
        self.legacy.str_lwr(string)
    }

    fn str_upr(&self, string: &mut [u16]) {
        self.legacy.str_upr(string)
    }

    fn fat_to_str(&self, fat: &[u8], string: &mut [u16]) {
        self.legacy.fat_to_str(fat, string)
    }

    fn str_to_fat(&self, string: &[u16], fat: &mut [u8]) -> bool {
        self.legacy.str_to_fat(string, fat)
    }

    fn supported_languages(&self) -> &str {
        self.languages.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl UnicodeCollation for Upper {
        fn stri_coll(&self, s1: &[u16], s2: &[u16]) -> isize {
            s1.len() as isize - s2.len() as isize
        }

        fn metai_match(&self, _string: &[u16], pattern: &[u16]) -> bool {
            pattern == [u16::from(b'*')]
        }

        fn str_lwr(&self, string: &mut [u16]) {
            string.fill(u16::from(b'l'));
        }

        fn str_upr(&self, string: &mut [u16]) {
            string.fill(u16::from(b'U'));
        }

        fn fat_to_str(&self, fat: &[u8], string: &mut [u16]) {
            for (out, byte) in string.iter_mut().zip(fat) {
                *out = u16::from(*byte);
            }
        }

        fn str_to_fat(&self, string: &[u16], fat: &mut [u8]) -> bool {
            fat.fill(b'_');
            string.len() > 8
        }

        fn supported_languages(&self) -> &str {
            "eng"
        }
    }

    fn sealed() -> Uc2Thunk {
        let mut pending = UC2_THUNK_TEMPLATE.clone();
        pending.attach_legacy(Arc::new(Upper));
        let mut languages = LanguageBuffer::with_capacity(8);
        languages.try_push_str("en-US").unwrap();
        pending.attach_languages(languages);
        pending.seal().unwrap()
    }

    #[test]
    fn signature_spells_uc2() {
        assert_eq!(UC2_THUNK_SIGNATURE.to_le_bytes(), *b"_UC2");
        assert_eq!(UC2_THUNK_TEMPLATE.signature(), UC2_THUNK_SIGNATURE);
    }

    #[test]
    fn template_starts_empty() {
        assert!(UC2_THUNK_TEMPLATE.legacy().is_none());
        assert!(matches!(
            UC2_THUNK_TEMPLATE.clone().seal(),
            Err(ThunkError::Incomplete { missing: "legacy" })
        ));
    }

    #[test]
    fn seal_requires_languages() {
        let mut pending = UC2_THUNK_TEMPLATE.clone();
        pending.attach_legacy(Arc::new(Upper));
        assert!(matches!(
            pending.seal(),
            Err(ThunkError::Incomplete {
                missing: "languages"
            })
        ));
    }

    #[test]
    fn sealed_record_reports_converted_languages() {
        let thunk = sealed();
        assert_eq!(thunk.signature(), UC2_THUNK_SIGNATURE);
        assert_eq!(thunk.supported_languages(), "en-US");
        assert_eq!(thunk.legacy().supported_languages(), "eng");
    }

    #[test]
    fn operations_forward_to_legacy() {
        let thunk = sealed();
        let abc: Vec<u16> = "abc".encode_utf16().collect();
        let star: Vec<u16> = "*".encode_utf16().collect();

        assert_eq!(thunk.stri_coll(&abc, &star), 2);
        assert!(thunk.metai_match(&abc, &star));

        let mut text = abc.clone();
        thunk.str_upr(&mut text);
        assert_eq!(String::from_utf16_lossy(&text), "UUU");
        thunk.str_lwr(&mut text);
        assert_eq!(String::from_utf16_lossy(&text), "lll");

        let mut name = [0u16; 4];
        thunk.fat_to_str(b"AB", &mut name);
        assert_eq!(&name[..2], &[u16::from(b'A'), u16::from(b'B')]);

        let mut fat = [0u8; 11];
        assert!(!thunk.str_to_fat(&abc, &mut fat));
        assert_eq!(fat, [b'_'; 11]);
    }

    #[test]
    fn debug_hides_legacy_instance() {
        let rendered = format!("{:?}", sealed());
        assert!(rendered.contains("0x3243555f"));
        assert!(rendered.contains("en-US"));
    }
}
