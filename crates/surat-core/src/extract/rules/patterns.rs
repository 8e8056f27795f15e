//! Common regex patterns for Indonesian/English letter extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Document number candidates, in scan order
    pub static ref NUMBER_SEGMENTED: Regex = Regex::new(
        r"(?i)\b[A-Z0-9][A-Z0-9.]*(?:[/\-][A-Z0-9][A-Z0-9.]*)+"
    ).unwrap();

    pub static ref NUMBER_ROMAN_YEAR: Regex = Regex::new(
        r"(?i)\b\d{1,5}\s*/\s*(?:[A-Z0-9.\-]+\s*/\s*)*(?:XII|XI|IX|X|VIII|VII|VI|IV|V|III|II|I)\s*/\s*\d{4}\b"
    ).unwrap();

    pub static ref NUMBER_INVOICE: Regex = Regex::new(
        r"(?i)\bINV[\-/.]?[A-Z0-9][A-Z0-9/\-]*"
    ).unwrap();

    pub static ref NUMBER_B_PREFIX: Regex = Regex::new(
        r"(?i)\bB-[A-Z0-9][A-Z0-9/\-.]*"
    ).unwrap();

    // Phone-number shaped text (Indonesian +62 / 0xx formats)
    pub static ref PHONE: Regex = Regex::new(
        r"(?:\+62|\(0\d{2,3}\)|\b0\d{2,4})[\s\-.]?\d{3,4}[\s\-.]?\d{3,5}\b"
    ).unwrap();

    pub static ref PHONE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:telp|telepon|tlp|tel|phone|fax|faks|facs|hp|mobile|wa|whatsapp)\b"
    ).unwrap();

    // Email pattern
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    // Date shapes, in priority order
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b\d{4}[/.\-]\d{1,2}[/.\-]\d{1,2}\b"
    ).unwrap();

    pub static ref DATE_D_MONTH_Y: Regex = Regex::new(
        r"\b\d{1,2}\s+[A-Za-z]+\.?,?\s+\d{4}\b"
    ).unwrap();

    pub static ref DATE_WEEKDAY_D_MONTH_Y: Regex = Regex::new(
        r"\b[A-Za-z]+\s*,\s*\d{1,2}\s+[A-Za-z]+\s+\d{4}\b"
    ).unwrap();

    pub static ref DATE_D_MONTH_Y_DASHED: Regex = Regex::new(
        r"\b\d{1,2}-[A-Za-z]+-\d{2,4}\b"
    ).unwrap();

    // Subject label
    pub static ref SUBJECT_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:perihal|subject|re|hal)\b\s*:?\s*(.*)$"
    ).unwrap();

    // Amounts
    pub static ref RUPIAH_AMOUNT: Regex = Regex::new(
        r"(?i)\bRp\.?\s*(\d[\d.,]*\d|\d)"
    ).unwrap();

    pub static ref LINE_END_AMOUNT: Regex = Regex::new(
        r"(?:^|[^\d.,])(\d{1,3}(?:\.\d{3})+(?:,\d{1,2})?)\s*(?:,-)?\s*$"
    ).unwrap();

    pub static ref BANK_LINE: Regex = Regex::new(
        r"(?i)\b(?:bank|rek|rekening|no\.?\s*rek|account|acc|a/c|swift|iban|bic|virtual\s+account)\b"
    ).unwrap();

    // Indonesian number formats
    pub static ref ID_GROUPED_COMMA_DECIMAL: Regex = Regex::new(
        r"^(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d+)?$"
    ).unwrap();

    pub static ref ID_GROUPED_DOT_CENTS: Regex = Regex::new(
        r"^\d{1,3}(?:\.\d{3})*\.\d{2}$"
    ).unwrap();

    // Sender header exclusions
    pub static ref ADDRESS_LINE: Regex = Regex::new(
        r"(?i)(?:\b(?:jl|jln|jalan|street|road|rd|kel|kelurahan|kec|kecamatan|kab|kabupaten|provinsi|gedung|gd|lantai|lt|blok|komp|komplek|kompleks|ruko)\b\.?|\brt\.?\s*\d|\brw\.?\s*\d|\bkode\s*pos\b|\b\d{5}\b)"
    ).unwrap();

    pub static ref WEB_LINE: Regex = Regex::new(
        r"(?i)(?:\be-?mail\b|\bwebsite\b|\bweb\b|www\.|https?://|\.com\b|\.co\.id\b|\.go\.id\b|\.or\.id\b)"
    ).unwrap();

    pub static ref TAX_ID_LINE: Regex = Regex::new(
        r"(?i)\b(?:npwp|nib|siup|tdp|nik|tax\s*id|vat\s*no)\b"
    ).unwrap();

    pub static ref NUMBER_LABEL_LINE: Regex = Regex::new(
        r"(?i)^\s*(?:no|nomor|nomer|number|invoice\s+no|ref|reference)\b\.?\s*:?"
    ).unwrap();

    pub static ref SUBJECT_LINE: Regex = Regex::new(
        r"(?i)^\s*(?:perihal|subject|hal|re|lampiran|attachment|lamp)\b"
    ).unwrap();

    pub static ref ADDRESSEE_LINE: Regex = Regex::new(
        r"(?i)(?:\bkepada\b|\byth\b|\bto\s*:|\bdear\b|\bdi\s*tempat\b)"
    ).unwrap();

    pub static ref MONTH_WITH_YEAR: Regex = Regex::new(
        r"(?i)\b(?:januari|january|februari|february|maret|march|april|mei|may|juni|june|juli|july|agustus|august|september|oktober|october|november|desember|december)\b\s*,?\s*\d{4}\b"
    ).unwrap();

    pub static ref SIGNATURE_LINE: Regex = Regex::new(
        r"(?i)(?:\bhormat\s+kami\b|\bhormat\s+saya\b|\bttd\b|\btertanda\b|\batas\s+nama\b|\ba\.n\.|\bsincerely\b|\bbest\s+regards\b|\bkind\s+regards\b|\bregards\b|\byours\s+faithfully\b|\byours\s+truly\b)"
    ).unwrap();

    pub static ref TITLE_CASE_WORDS: Regex = Regex::new(
        r"^(?:[A-Z][A-Za-z&.'\-]*\s+)+[A-Z][A-Za-z&.'\-]*$"
    ).unwrap();
}
