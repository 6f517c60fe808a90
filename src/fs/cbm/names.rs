//! ### Host file names
//!
//! Directory names can hold spaces, punctuation, and padding that make poor
//! host file names.  Here a translated name is reduced to capitalized words
//! joined by `_`, e.g. `MY GAME!` becomes `My_Game`.

use super::types;

#[derive(PartialEq,Clone,Copy)]
enum WordState {
    Starting,
    InWord,
    AfterSeparator
}

fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || c==' '
}

/// Suggest a host file name for a translated directory name.
/// If `add_extension` is true the lower case type name is appended, e.g. `.prg`.
pub fn normalize(name: &str,type_code: u8,add_extension: bool) -> String {
    let mut ans = String::new();
    let mut state = WordState::Starting;
    for c in name.chars().skip_while(|c| !is_printable(*c)) {
        if c.is_ascii_alphanumeric() {
            match state {
                WordState::InWord => ans.push(c.to_ascii_lowercase()),
                _ => ans.push(c.to_ascii_uppercase())
            }
            state = WordState::InWord;
        } else if c=='-' {
            ans.push('-');
            state = WordState::AfterSeparator;
        } else {
            if state==WordState::InWord {
                ans.push('_');
            }
            state = WordState::AfterSeparator;
        }
    }
    let mut ans = ans.trim_end_matches('_').to_string();
    if ans.is_empty() {
        ans = "Noname".to_string();
    }
    if add_extension {
        ans += ".";
        ans += &types::type_name(type_code).to_lowercase();
    }
    ans
}
