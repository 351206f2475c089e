/// 将标题转换为 URL 安全的 slug
///
/// 1. 转为小写
/// 2. 带重音的元音和 `ç` 替换为对应的 ASCII 字母
/// 3. `[a-z0-9]` 之外的连续字符合并为一个 `-`
/// 4. 去掉首尾的 `-`
///
/// ```
/// use imprensa::content::derive_slug;
///
/// assert_eq!(derive_slug("Política: Nova Lei"), "politica-nova-lei");
/// ```
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars().map(fold_accent) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        other => other,
    }
}
