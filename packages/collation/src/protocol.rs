//! The two Unicode Collation interface revisions and their protocol identities.
//!
//! Strings are UCS-2 code units without the terminator. FAT names are OEM
//! bytes; their length is the `FatSize` of the firmware interface.

use efi_protocol_db::{Guid, Protocol};

/// The EFI 1.10 Unicode Collation interface.
///
/// # Object Safety
///
/// This trait is object-safe and is published as `Arc<dyn UnicodeCollation>`.
pub trait UnicodeCollation: Send + Sync {
    /// Case-insensitive comparison.
    ///
    /// # Returns
    ///
    /// * `0` - `s1` is equivalent to `s2`.
    /// * `> 0` - `s1` is lexically greater than `s2`.
    /// * `< 0` - `s1` is lexically less than `s2`.
    fn stri_coll(&self, s1: &[u16], s2: &[u16]) -> isize;

    /// Case-insensitive wildcard match of `pattern` against `string`.
    fn metai_match(&self, string: &[u16], pattern: &[u16]) -> bool;

    /// Lower-case `string` in place.
    fn str_lwr(&self, string: &mut [u16]);

    /// Upper-case `string` in place.
    fn str_upr(&self, string: &mut [u16]);

    /// Convert an 8.3 FAT name in the OEM character set to Unicode.
    ///
    /// `string` must hold at least `fat.len()` code units.
    fn fat_to_str(&self, fat: &[u8], string: &mut [u16]);

    /// Convert `string` to legal FAT name characters in the OEM character set.
    ///
    /// Returns `true` if the name needs long file name handling.
    fn str_to_fat(&self, string: &[u16], fat: &mut [u8]) -> bool;

    /// Supported languages as concatenated ISO 639-2 codes, e.g. `"engfra"`.
    fn supported_languages(&self) -> &str;
}

/// The UEFI 2.x Unicode Collation 2 interface.
///
/// Same operations as [`UnicodeCollation`]; only the language list format
/// changes.
pub trait UnicodeCollation2: Send + Sync {
    /// Case-insensitive comparison; see [`UnicodeCollation::stri_coll`].
    fn stri_coll(&self, s1: &[u16], s2: &[u16]) -> isize;

    /// Case-insensitive wildcard match of `pattern` against `string`.
    fn metai_match(&self, string: &[u16], pattern: &[u16]) -> bool;

    /// Lower-case `string` in place.
    fn str_lwr(&self, string: &mut [u16]);

    /// Upper-case `string` in place.
    fn str_upr(&self, string: &mut [u16]);

    /// Convert an 8.3 FAT name in the OEM character set to Unicode.
    fn fat_to_str(&self, fat: &[u8], string: &mut [u16]);

    /// Convert `string` to a FAT name; `true` if it needs long file name handling.
    fn str_to_fat(&self, string: &[u16], fat: &mut [u8]) -> bool;

    /// Supported languages as a `;`-separated RFC 4646 list, e.g. `"en-US;fr"`.
    fn supported_languages(&self) -> &str;
}

/// Protocol marker for [`UnicodeCollation`].
pub struct UnicodeCollationProtocol;

impl Protocol for UnicodeCollationProtocol {
    const GUID: Guid = Guid::from_u128(0x1d85cd7f_f43d_11d2_9a0c_0090273fc14d);
    const NAME: &'static str = "UnicodeCollation";
    type Interface = dyn UnicodeCollation;
}

/// Protocol marker for [`UnicodeCollation2`].
pub struct UnicodeCollation2Protocol;

impl Protocol for UnicodeCollation2Protocol {
    const GUID: Guid = Guid::from_u128(0xa4c751fc_23ae_4c3e_92e9_4964cf63f349);
    const NAME: &'static str = "UnicodeCollation2";
    type Interface = dyn UnicodeCollation2;
}
