//! 语言表
//!
//! 页面上的语言名五花八门（`Python3`、`C++`、`golang`），统一映射到规范标识和文件扩展名

use phf::phf_map;

/// 规范化后的语言信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// 规范标识，同时用作代码块的语言标注
    pub id: &'static str,
    /// 文件扩展名（不含点）
    pub extension: &'static str,
}

/// 什么线索都没有时使用的语言
pub const DEFAULT_LANGUAGE: &str = "python";

/// 未知语言的扩展名
pub const PLAIN_TEXT_EXTENSION: &str = "txt";

const fn lang(id: &'static str, extension: &'static str) -> LanguageInfo {
    LanguageInfo { id, extension }
}

/// 别名 → 语言信息（键均为小写）
static LANGUAGES: phf::Map<&'static str, LanguageInfo> = phf_map! {
    "python" => lang("python", "py"),
    "python3" => lang("python", "py"),
    "py" => lang("python", "py"),
    "java" => lang("java", "java"),
    "javascript" => lang("javascript", "js"),
    "js" => lang("javascript", "js"),
    "typescript" => lang("typescript", "ts"),
    "ts" => lang("typescript", "ts"),
    "c++" => lang("cpp", "cpp"),
    "cpp" => lang("cpp", "cpp"),
    "c" => lang("c", "c"),
    "c#" => lang("csharp", "cs"),
    "csharp" => lang("csharp", "cs"),
    "go" => lang("go", "go"),
    "golang" => lang("go", "go"),
    "rust" => lang("rust", "rs"),
    "swift" => lang("swift", "swift"),
    "kotlin" => lang("kotlin", "kt"),
    "scala" => lang("scala", "scala"),
    "ruby" => lang("ruby", "rb"),
    "php" => lang("php", "php"),
    "dart" => lang("dart", "dart"),
    "mysql" => lang("sql", "sql"),
    "sql" => lang("sql", "sql"),
};

/// 关键字启发式，按顺序匹配，越靠前越"独特"
const KEYWORD_RULES: &[(&str, &[&str])] = &[
    ("php", &["<?php"]),
    ("rust", &["fn ", "impl ", "let mut ", "Vec<", "-> i32"]),
    ("go", &["package main", "func ", ":= "]),
    ("cpp", &["#include", "vector<", "std::", "class Solution {\npublic:"]),
    ("java", &["public class", "public static", "System.out", "public int ", "public boolean "]),
    ("csharp", &["public class Solution {\n    public", "using System"]),
    ("python", &["def ", "class Solution:", "self.", "elif "]),
    ("kotlin", &["fun ", "val "]),
    ("typescript", &[": number", ": string", "): void"]),
    ("javascript", &["function", "var ", "const ", "let ", "=> "]),
    ("ruby", &["puts ", "end\n"]),
    ("swift", &["print("]),
];

/// 把页面上的语言名规范化，不认识返回 None
pub fn normalize_language(raw: &str) -> Option<&'static LanguageInfo> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    LANGUAGES.get(key.as_str())
}

/// 根据代码内容猜测语言
pub fn detect_from_code(code: &str) -> Option<&'static LanguageInfo> {
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| code.contains(k)))
        .and_then(|(id, _)| LANGUAGES.get(*id))
}

/// 规范标识对应的扩展名，未知语言返回 `txt`
pub fn extension_for(language: &str) -> &'static str {
    normalize_language(language)
        .map(|info| info.extension)
        .unwrap_or(PLAIN_TEXT_EXTENSION)
}
