//! Cyrillic to Latin transliteration table.
//!
//! The table covers the Ukrainian alphabet in both cases. Lookups are
//! case-sensitive: `'Щ'` and `'щ'` are separate entries.

/// Returns the Latin replacement for a Cyrillic letter, if the table has one.
///
/// # Examples
///
/// ```
/// use clean_folder::transliteration::transliterate;
///
/// assert_eq!(transliterate('Щ'), Some("Shch"));
/// assert_eq!(transliterate('ї'), Some("yi"));
/// assert_eq!(transliterate('ы'), None);
/// assert_eq!(transliterate('a'), None);
/// ```
pub fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "H",
        'Ґ' => "G",
        'Д' => "D",
        'Е' => "E",
        'Є' => "Ye",
        'Ж' => "Zh",
        'З' => "Z",
        'И' => "Y",
        'І' => "I",
        'Ї' => "Yi",
        'Й' => "Y",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "Kh",
        'Ц' => "Ts",
        'Ч' => "Ch",
        'Ш' => "Sh",
        'Щ' => "Shch",
        'Ю' => "Yu",
        'Я' => "Ya",
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "ye",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' => "yi",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}
