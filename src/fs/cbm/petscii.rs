//! ### Character translation
//!
//! The 1541 stores names in the machine's own 8-bit character codes.  What
//! the user sees depends on which character set the screen is in, so there
//! are two tables.  In the upper case set, codes 65-90 are capitals and the
//! shifted range is graphics.  In the lower case set, codes 65-90 are small
//! letters and 193-218 (or 97-122) are capitals.  Anything without a
//! sensible host equivalent comes out as `.`.

const FILLER: u8 = b'.';

/// Character set the listing is rendered in.
#[derive(PartialEq,Eq,Clone,Copy,Debug,Default)]
pub enum Charset {
    #[default]
    Uppercase,
    Lowercase
}

impl Charset {
    pub fn from_flag(lowercase: bool) -> Self {
        match lowercase {
            true => Self::Lowercase,
            false => Self::Uppercase
        }
    }
    /// Put host text into the case this set displays for plain letters
    pub fn apply_case(&self,s: &str) -> String {
        match self {
            Self::Uppercase => s.to_uppercase(),
            Self::Lowercase => s.to_lowercase()
        }
    }
}

const fn build_table(lowercase: bool) -> [u8;256] {
    let mut table = [FILLER;256];
    let mut code: usize = 32;
    while code < 256 {
        table[code] = match code {
            32..=64 => code as u8,
            65..=90 if lowercase => code as u8 + 32,
            65..=90 => code as u8,
            91 | 93 => code as u8,
            96 => b'-',
            97..=122 if lowercase => code as u8 - 32,
            193..=218 if lowercase => code as u8 - 128,
            _ => FILLER
        };
        code += 1;
    }
    table
}

static UPPERCASE_TABLE: [u8;256] = build_table(false);
static LOWERCASE_TABLE: [u8;256] = build_table(true);

/// Translate one character code for display.
pub fn translate(code: u8,charset: Charset) -> char {
    match charset {
        Charset::Uppercase => UPPERCASE_TABLE[code as usize] as char,
        Charset::Lowercase => LOWERCASE_TABLE[code as usize] as char
    }
}

/// Translate a run of character codes for display.
pub fn decode(codes: &[u8],charset: Charset) -> String {
    codes.iter().map(|c| translate(*c,charset)).collect()
}
