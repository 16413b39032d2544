/// Maps one lowercase Cyrillic character (or a space) to its Latin spelling
///
/// Returns `None` for characters outside the table.
fn map_char(c: char) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
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
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "eh",
        'ю' => "yu",
        'я' => "ya",
        ' ' => "-",
        _ => return None,
    };
    Some(mapped)
}

/// Transliterates Russian text into a Telegraph-style Latin slug
///
/// The text is lowercased, Cyrillic letters are spelled out per a fixed table,
/// spaces become hyphens, and `a-z`, `0-9` and `-` are kept as they are.
/// Everything else is dropped. Applying it twice gives the same result.
///
/// # Examples
///
/// ```
/// use telegraph_finder::slug::transliterate;
///
/// assert_eq!(transliterate("Привет мир"), "privet-mir");
/// assert_eq!(transliterate("hello-123"), "hello-123");
/// ```
pub fn transliterate(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars().flat_map(char::to_lowercase) {
        if let Some(mapped) = map_char(c) {
            result.push_str(mapped);
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            result.push(c);
        }
    }

    result
}
