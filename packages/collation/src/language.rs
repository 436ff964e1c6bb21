//! Language list conversion from ISO 639-2 to RFC 4646.
//!
//! Legacy collation drivers advertise their languages as concatenated
//! three-letter ISO 639-2 codes. The UEFI 2.x interface wants a
//! `;`-separated list of RFC 4646 tags in a buffer of fixed size.

use tracing::debug;

use crate::ConvertError;

/// Length of one ISO 639-2 code.
pub const ISO_639_2_ENTRY_SIZE: usize = 3;

/// Size of the RFC 4646 language buffer, terminator included.
pub const RFC_4646_ENTRY_SIZE: usize = 42 + 1;

/// A zero-initialized, fixed-capacity ASCII buffer for a language list.
///
/// The last byte is always reserved for the terminator, so at most
/// `capacity() - 1` bytes of tag text are stored. The buffer never grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl LanguageBuffer {
    /// Allocate a zeroed buffer with the global allocator.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_zeroed(vec![0; capacity])
    }

    /// Take ownership of preallocated storage. Its length is the capacity.
    pub fn from_zeroed(mut bytes: Vec<u8>) -> Self {
        bytes.fill(0);
        Self { bytes, len: 0 }
    }

    /// Total size, terminator included.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Longest tag text that fits.
    pub fn max_len(&self) -> usize {
        self.capacity().saturating_sub(1)
    }

    /// Bytes of tag text currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no tag text is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The stored list.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    /// Reset to all zeroes.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.len = 0;
    }

    /// Append ASCII text, or fail without writing anything if it would not fit.
    pub fn try_push_str(&mut self, text: &str) -> Result<(), ConvertError> {
        if !text.is_ascii() {
            return Err(ConvertError::Malformed {
                entry: text.to_string(),
            });
        }
        let end = self.len + text.len();
        if end > self.max_len() {
            return Err(ConvertError::CapacityExceeded {
                needed: end + 1,
                capacity: self.capacity(),
            });
        }
        self.bytes[self.len..end].copy_from_slice(text.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Converts a legacy language list into the RFC 4646 form.
pub trait TagConverter: Send + Sync {
    /// Convert `legacy` into `out`, replacing whatever `out` held.
    ///
    /// On error `out` may hold a partial list and must not be published.
    fn convert(&self, legacy: &str, out: &mut LanguageBuffer) -> Result<(), ConvertError>;
}

/// The default converter.
///
/// Entries are read as consecutive ISO 639-2 codes, or split on `;` when the
/// legacy list already uses separators. `eng` becomes `en-US`; other codes
/// become their two-letter primary subtag. Entries that are already RFC 4646
/// tags are kept. Unknown codes are skipped. The output is cut at an entry
/// boundary when the buffer is full.
///
/// Skipping is more permissive than the firmware HII converter, which rejects
/// the whole list on the first unknown code: `"qqqfra"` converts to `"fr"`
/// here, and only a list with no known code at all fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso639ToRfc4646;

impl TagConverter for Iso639ToRfc4646 {
    fn convert(&self, legacy: &str, out: &mut LanguageBuffer) -> Result<(), ConvertError> {
        out.clear();

        let entries = legacy_entries(legacy)?;
        if entries.is_empty() {
            return Err(ConvertError::Empty);
        }

        let mut first_unknown = None;
        for entry in entries {
            let Some(tag) = rfc4646_tag(entry)? else {
                first_unknown.get_or_insert(entry);
                continue;
            };

            let separator = if out.is_empty() { "" } else { ";" };
            if out.len() + separator.len() + tag.len() > out.max_len() {
                if out.is_empty() {
                    return Err(ConvertError::CapacityExceeded {
                        needed: tag.len() + 1,
                        capacity: out.capacity(),
                    });
                }
                debug!(dropped = entry, capacity = out.capacity(), "language list truncated");
                break;
            }
            out.try_push_str(separator)?;
            out.try_push_str(tag)?;
        }

        if out.is_empty() {
            return Err(ConvertError::Unsupported {
                code: first_unknown.unwrap_or_default().to_string(),
            });
        }
        Ok(())
    }
}

fn legacy_entries(legacy: &str) -> Result<Vec<&str>, ConvertError> {
    if !legacy.is_ascii() {
        return Err(ConvertError::Malformed {
            entry: legacy.to_string(),
        });
    }
    if legacy.contains(';') {
        return Ok(legacy.split(';').filter(|entry| !entry.is_empty()).collect());
    }
    if legacy.contains('-') || legacy.len() == 2 {
        return Ok(vec![legacy]);
    }
    if legacy.len() % ISO_639_2_ENTRY_SIZE != 0 {
        return Err(ConvertError::Malformed {
            entry: legacy.to_string(),
        });
    }
    Ok((0..legacy.len())
        .step_by(ISO_639_2_ENTRY_SIZE)
        .map(|start| &legacy[start..start + ISO_639_2_ENTRY_SIZE])
        .collect())
}

/// `Ok(None)` for a well-formed ISO 639-2 code with no mapping.
fn rfc4646_tag(entry: &str) -> Result<Option<&str>, ConvertError> {
    let is_rfc4646 = entry.len() == 2 || entry.contains('-');
    if is_rfc4646 {
        let well_formed = entry.split('-').all(|subtag| {
            (1..=8).contains(&subtag.len()) && subtag.bytes().all(|b| b.is_ascii_alphanumeric())
        });
        return if well_formed {
            Ok(Some(entry))
        } else {
            Err(ConvertError::Malformed {
                entry: entry.to_string(),
            })
        };
    }

    if entry.len() != ISO_639_2_ENTRY_SIZE || !entry.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ConvertError::Malformed {
            entry: entry.to_string(),
        });
    }
    if entry.eq_ignore_ascii_case("eng") {
        return Ok(Some("en-US"));
    }
    Ok(ISO_639_2_TO_RFC_4646
        .iter()
        .find(|(iso, _)| iso.eq_ignore_ascii_case(entry))
        .map(|(_, tag)| *tag))
}

/// ISO 639-2 (terminology and bibliographic codes) to primary language subtag.
#[rustfmt::skip]
const ISO_639_2_TO_RFC_4646: &[(&str, &str)] = &[
    ("aar", "aa"), ("abk", "ab"), ("afr", "af"), ("amh", "am"), ("ara", "ar"),
    ("asm", "as"), ("aym", "ay"), ("aze", "az"), ("bak", "ba"), ("bel", "be"),
    ("ben", "bn"), ("bih", "bh"), ("bis", "bi"), ("bod", "bo"), ("tib", "bo"),
    ("bre", "br"), ("bul", "bg"), ("cat", "ca"), ("ces", "cs"), ("cze", "cs"),
    ("cos", "co"), ("cym", "cy"), ("wel", "cy"), ("dan", "da"), ("deu", "de"),
    ("ger", "de"), ("dzo", "dz"), ("ell", "el"), ("gre", "el"), ("epo", "eo"),
    ("est", "et"), ("eus", "eu"), ("baq", "eu"), ("fao", "fo"), ("fas", "fa"),
    ("per", "fa"), ("fij", "fj"), ("fin", "fi"), ("fra", "fr"), ("fre", "fr"),
    ("fry", "fy"), ("gle", "ga"), ("gla", "gd"), ("glg", "gl"), ("grn", "gn"),
    ("guj", "gu"), ("hau", "ha"), ("heb", "he"), ("hin", "hi"), ("hrv", "hr"),
    ("hun", "hu"), ("hye", "hy"), ("arm", "hy"), ("ina", "ia"), ("ind", "id"),
    ("ile", "ie"), ("ipk", "ik"), ("isl", "is"), ("ice", "is"), ("ita", "it"),
    ("iku", "iu"), ("jpn", "ja"), ("jav", "jv"), ("kal", "kl"), ("kan", "kn"),
    ("kas", "ks"), ("kat", "ka"), ("geo", "ka"), ("kaz", "kk"), ("khm", "km"),
    ("kin", "rw"), ("kir", "ky"), ("kor", "ko"), ("kur", "ku"), ("lao", "lo"),
    ("lat", "la"), ("lav", "lv"), ("lin", "ln"), ("lit", "lt"), ("mal", "ml"),
    ("mar", "mr"), ("mkd", "mk"), ("mac", "mk"), ("mlg", "mg"), ("mlt", "mt"),
    ("mon", "mn"), ("mri", "mi"), ("mao", "mi"), ("msa", "ms"), ("may", "ms"),
    ("mya", "my"), ("bur", "my"), ("nau", "na"), ("nep", "ne"), ("nld", "nl"),
    ("dut", "nl"), ("nor", "no"), ("oci", "oc"), ("orm", "om"), ("ori", "or"),
    ("pan", "pa"), ("pol", "pl"), ("por", "pt"), ("pus", "ps"), ("que", "qu"),
    ("roh", "rm"), ("ron", "ro"), ("rum", "ro"), ("run", "rn"), ("rus", "ru"),
    ("san", "sa"), ("sin", "si"), ("slk", "sk"), ("slo", "sk"), ("slv", "sl"),
    ("smo", "sm"), ("sna", "sn"), ("snd", "sd"), ("som", "so"), ("sot", "st"),
    ("spa", "es"), ("sqi", "sq"), ("alb", "sq"), ("srp", "sr"), ("ssw", "ss"),
    ("sun", "su"), ("swa", "sw"), ("swe", "sv"), ("tam", "ta"), ("tat", "tt"),
    ("tel", "te"), ("tgk", "tg"), ("tgl", "tl"), ("tha", "th"), ("tir", "ti"),
    ("ton", "to"), ("tsn", "tn"), ("tso", "ts"), ("tuk", "tk"), ("tur", "tr"),
    ("twi", "tw"), ("uig", "ug"), ("ukr", "uk"), ("urd", "ur"), ("uzb", "uz"),
    ("vie", "vi"), ("vol", "vo"), ("wol", "wo"), ("xho", "xh"), ("yid", "yi"),
    ("yor", "yo"), ("zha", "za"), ("zho", "zh"), ("chi", "zh"), ("zul", "zu"),
];
