use phf::{Map, phf_map};

/// Element symbols indexed by atomic number minus one.
static ELEMENT_SYMBOLS: [&str; 100] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm",
];

static ATOMIC_NUMBERS: Map<&'static str, u8> = phf_map! {
    "h" => 1, "he" => 2, "li" => 3, "be" => 4, "b" => 5, "c" => 6, "n" => 7, "o" => 8,
    "f" => 9, "ne" => 10, "na" => 11, "mg" => 12, "al" => 13, "si" => 14, "p" => 15, "s" => 16,
    "cl" => 17, "ar" => 18, "k" => 19, "ca" => 20, "sc" => 21, "ti" => 22, "v" => 23, "cr" => 24,
    "mn" => 25, "fe" => 26, "co" => 27, "ni" => 28, "cu" => 29, "zn" => 30, "ga" => 31, "ge" => 32,
    "as" => 33, "se" => 34, "br" => 35, "kr" => 36, "rb" => 37, "sr" => 38, "y" => 39, "zr" => 40,
    "nb" => 41, "mo" => 42, "tc" => 43, "ru" => 44, "rh" => 45, "pd" => 46, "ag" => 47, "cd" => 48,
    "in" => 49, "sn" => 50, "sb" => 51, "te" => 52, "i" => 53, "xe" => 54, "cs" => 55, "ba" => 56,
    "la" => 57, "ce" => 58, "pr" => 59, "nd" => 60, "pm" => 61, "sm" => 62, "eu" => 63, "gd" => 64,
    "tb" => 65, "dy" => 66, "ho" => 67, "er" => 68, "tm" => 69, "yb" => 70, "lu" => 71, "hf" => 72,
    "ta" => 73, "w" => 74, "re" => 75, "os" => 76, "ir" => 77, "pt" => 78, "au" => 79, "hg" => 80,
    "tl" => 81, "pb" => 82, "bi" => 83, "po" => 84, "at" => 85, "rn" => 86, "fr" => 87, "ra" => 88,
    "ac" => 89, "th" => 90, "pa" => 91, "u" => 92, "np" => 93, "pu" => 94, "am" => 95, "cm" => 96,
    "bk" => 97, "cf" => 98, "es" => 99, "fm" => 100,
};

/// Single-bond covalent radii in Angstroms (Cordero et al., 2008) for the first four periods
/// plus a few common heavier elements.
static COVALENT_RADII: Map<u8, f64> = phf_map! {
    1u8 => 0.31, 2u8 => 0.28, 3u8 => 1.28, 4u8 => 0.96, 5u8 => 0.84, 6u8 => 0.76, 7u8 => 0.71,
    8u8 => 0.66, 9u8 => 0.57, 10u8 => 0.58, 11u8 => 1.66, 12u8 => 1.41, 13u8 => 1.21,
    14u8 => 1.11, 15u8 => 1.07, 16u8 => 1.05, 17u8 => 1.02, 18u8 => 1.06, 19u8 => 2.03,
    20u8 => 1.76, 21u8 => 1.70, 22u8 => 1.60, 23u8 => 1.53, 24u8 => 1.39, 25u8 => 1.39,
    26u8 => 1.32, 27u8 => 1.26, 28u8 => 1.24, 29u8 => 1.32, 30u8 => 1.22, 31u8 => 1.22,
    32u8 => 1.20, 33u8 => 1.19, 34u8 => 1.20, 35u8 => 1.20, 36u8 => 1.16, 46u8 => 1.39,
    47u8 => 1.45, 50u8 => 1.39, 53u8 => 1.39, 78u8 => 1.36, 79u8 => 1.36,
};

/// Looks up the atomic number for an element symbol, ignoring case and surrounding whitespace.
pub fn atomic_number(symbol: &str) -> Option<u8> {
    ATOMIC_NUMBERS
        .get(symbol.trim().to_ascii_lowercase().as_str())
        .copied()
}

/// Returns the canonical element symbol for an atomic number.
pub fn symbol(atomic_number: u8) -> Option<&'static str> {
    (atomic_number as usize)
        .checked_sub(1)
        .and_then(|idx| ELEMENT_SYMBOLS.get(idx))
        .copied()
}

pub fn covalent_radius(atomic_number: u8) -> Option<f64> {
    COVALENT_RADII.get(&atomic_number).copied()
}

/// Resolves an element token from a geometry file: either a symbol or a bare atomic number.
pub fn parse_element(token: &str) -> Option<u8> {
    let token = token.trim();
    match token.parse::<u8>() {
        Ok(z) => symbol(z).map(|_| z),
        Err(_) => atomic_number(token),
    }
}
