use glob::glob;
use log::debug;
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum VdfValue {
    Str(String),
    Obj(Vec<(String, VdfValue)>), // Preserves order
}

impl VdfValue {
    pub fn get(&self, key: &str) -> Option<&VdfValue> {
        if let VdfValue::Obj(entries) = self {
            for (k, v) in entries {
                if k.eq_ignore_ascii_case(key) {
                    return Some(v);
                }
            }
        }
        None
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VdfValue::Str(s) => Some(s),
            VdfValue::Obj(_) => None,
        }
    }

    /// Every string stored under `key`, at any depth, in document order.
    pub fn find_all<'a>(&'a self, key: &str, out: &mut Vec<&'a str>) {
        if let VdfValue::Obj(entries) = self {
            for (k, v) in entries {
                match v {
                    VdfValue::Str(s) if k.eq_ignore_ascii_case(key) => out.push(s),
                    VdfValue::Obj(_) => v.find_all(key, out),
                    _ => {}
                }
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Text(String),
}

/// Steam install layout helpers.
pub struct GamePathFinder;

impl GamePathFinder {
    /// Primary Steam folder followed by every extra library listed in
    /// `steamapps/libraryfolders.vdf`.
    pub fn library_folders(steam_path: &Path) -> Vec<PathBuf> {
        let vdf_path = steam_path.join("steamapps").join("libraryfolders.vdf");
        match fs::read_to_string(&vdf_path) {
            Ok(content) => Self::parse_library_paths(&content, steam_path),
            Err(e) => {
                debug!("No library list at {}: {}", vdf_path.display(), e);
                vec![steam_path.to_path_buf()]
            }
        }
    }

    /// Extracts library paths from `libraryfolders.vdf` text.
    ///
    /// The primary path always comes first; duplicates of it (and of each
    /// other) are dropped. Structurally broken files fall back to a line scan.
    pub fn parse_library_paths(content: &str, steam_path: &Path) -> Vec<PathBuf> {
        let mut raw: Vec<String> = Vec::new();
        match Self::parse_vdf(content) {
            Some(root) => {
                let mut found = Vec::new();
                root.find_all("path", &mut found);
                raw.extend(found.into_iter().map(str::to_string));
            }
            None => {
                debug!("libraryfolders.vdf is malformed, scanning lines");
                raw.extend(Self::scan_path_lines(content));
            }
        }

        let mut folders = vec![steam_path.to_path_buf()];
        let mut seen = vec![normalize(&steam_path.to_string_lossy())];
        for path_str in raw {
            let key = normalize(&path_str);
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            folders.push(PathBuf::from(path_str));
        }
        folders
    }

    fn scan_path_lines(content: &str) -> Vec<String> {
        let Ok(re) = Regex::new(r#""path"\s+"(.+?)""#) else {
            return Vec::new();
        };
        re.captures_iter(content)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str().replace("\\\\", "\\"))
            .collect()
    }

    /// `installdir` (lowercased) to display name, from a library's app manifests.
    pub fn installed_app_names(library: &Path) -> HashMap<String, String> {
        let mut names = HashMap::new();
        let pattern = library.join("steamapps").join("appmanifest_*.acf");
        let Ok(paths) = glob(&pattern.to_string_lossy()) else {
            return names;
        };
        for path in paths.flatten() {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            if let Some((install_dir, name)) = Self::extract_app_name(&content) {
                names.insert(install_dir.to_lowercase(), name);
            }
        }
        names
    }

    /// `(installdir, name)` from an `appmanifest_*.acf`.
    pub fn extract_app_name(manifest_content: &str) -> Option<(String, String)> {
        let root = Self::parse_vdf(manifest_content)?;
        let state = root.get("AppState").unwrap_or(&root);
        let install_dir = state.get("installdir")?.as_str()?.to_string();
        let name = state.get("name")?.as_str()?.to_string();
        Some((install_dir, name))
    }

    // --- Minimal VDF Parser ---
    /// Parses text VDF. Returns `None` when braces don't balance or a key has no value.
    pub fn parse_vdf(input: &str) -> Option<VdfValue> {
        let mut tokens = VecDeque::new();
        let mut chars = input.chars().peekable();
        while let Some(c) = chars.next() {
            if c.is_whitespace() {
                continue;
            }
            match c {
                '{' => tokens.push_back(Token::Open),
                '}' => tokens.push_back(Token::Close),
                '/' if chars.peek() == Some(&'/') => {
                    // Line comment
                    for next in chars.by_ref() {
                        if next == '\n' {
                            break;
                        }
                    }
                }
                '"' => {
                    let mut s = String::new();
                    let mut closed = false;
                    while let Some(next) = chars.next() {
                        match next {
                            '"' => {
                                closed = true;
                                break;
                            }
                            '\\' => {
                                if let Some(escaped) = chars.next() {
                                    match escaped {
                                        'n' => s.push('\n'),
                                        't' => s.push('\t'),
                                        other => s.push(other),
                                    }
                                }
                            }
                            other => s.push(other),
                        }
                    }
                    if !closed {
                        return None;
                    }
                    tokens.push_back(Token::Text(s));
                }
                _ => {
                    let mut s = c.to_string();
                    while let Some(&next) = chars.peek() {
                        if next.is_whitespace() || next == '{' || next == '}' || next == '"' {
                            break;
                        }
                        s.push(next);
                        chars.next();
                    }
                    tokens.push_back(Token::Text(s));
                }
            }
        }

        Self::parse_obj(&mut tokens, false)
    }

    fn parse_obj(tokens: &mut VecDeque<Token>, nested: bool) -> Option<VdfValue> {
        let mut entries = Vec::new();

        while let Some(token) = tokens.pop_front() {
            let key = match token {
                Token::Close if nested => return Some(VdfValue::Obj(entries)),
                Token::Close | Token::Open => return None,
                Token::Text(k) => k,
            };

            match tokens.pop_front()? {
                Token::Open => {
                    let nested_obj = Self::parse_obj(tokens, true)?;
                    entries.push((key, nested_obj));
                }
                Token::Text(v) => entries.push((key, VdfValue::Str(v))),
                Token::Close => return None,
            }
        }

        if nested {
            None
        } else {
            Some(VdfValue::Obj(entries))
        }
    }
}

fn normalize(path: &str) -> String {
    path.replace("\\\\", "\\")
        .replace('/', "\\")
        .trim_end_matches('\\')
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY_VDF: &str = r#"
"libraryfolders"
{
	"0"
	{
		"path"		"C:\\Program Files (x86)\\Steam"
		"label"		""
		"apps"
		{
			"228980"		"264924837"
		}
	}
	"1"
	{
		"path"		"D:\\SteamLibrary"
		"totalsize"		"0"
	}
}
"#;

    #[test]
    fn parses_nested_objects() {
        let root = GamePathFinder::parse_vdf(LIBRARY_VDF).unwrap();
        let lib = root.get("libraryfolders").unwrap();
        let first = lib.get("0").unwrap();
        assert_eq!(
            first.get("path").and_then(VdfValue::as_str),
            Some(r"C:\Program Files (x86)\Steam")
        );
        assert!(first.get("apps").unwrap().get("228980").is_some());
    }

    #[test]
    fn quoted_braces_are_text() {
        let root = GamePathFinder::parse_vdf(r#""a" "{" "b" "}""#).unwrap();
        assert_eq!(root.get("a").and_then(VdfValue::as_str), Some("{"));
        assert_eq!(root.get("b").and_then(VdfValue::as_str), Some("}"));
    }

    #[test]
    fn unbalanced_input_is_rejected() {
        assert!(GamePathFinder::parse_vdf(r#""root" { "path" "x""#).is_none());
        assert!(GamePathFinder::parse_vdf(r#""root" "x" }"#).is_none());
        assert!(GamePathFinder::parse_vdf(r#""dangling""#).is_none());
    }

    #[test]
    fn broken_library_file_falls_back_to_line_scan() {
        let broken = "\"libraryfolders\"\n{\n\t\"1\"\n\t{\n\t\t\"path\"\t\t\"E:\\\\Games\\\\Steam\"\n";
        let libs = GamePathFinder::parse_library_paths(broken, Path::new(r"C:\Steam"));
        assert_eq!(libs, vec![PathBuf::from(r"C:\Steam"), PathBuf::from(r"E:\Games\Steam")]);
    }

    #[test]
    fn extracts_app_name_from_manifest() {
        let acf = r#"
"AppState"
{
	"appid"		"1091500"
	"name"		"Cyberpunk 2077"
	"installdir"		"Cyberpunk 2077"
}
"#;
        assert_eq!(
            GamePathFinder::extract_app_name(acf),
            Some(("Cyberpunk 2077".to_string(), "Cyberpunk 2077".to_string()))
        );
    }
}
