//! Placeholder Substitution
//!
//! WordML（`word/document.xml`など）中の`{{ key }}`をコンテキストの値で置き換える。
//!
//! Wordは入力中の文字列を複数の`<w:r>`（ラン）に分割して保存することがあるため、
//! `{{`と`}}`の間に挟まったタグを取り除いてから置換します。

use once_cell::sync::Lazy;
use quick_xml::escape::escape;
use regex::{Captures, Regex};
use std::collections::BTreeSet;

use crate::context::Context;

/// `{`と`{`の間にタグだけが挟まっているもの
static SPLIT_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(?:<[^>]*>)+\{").unwrap());

/// `}`と`}`の間にタグだけが挟まっているもの
static SPLIT_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\}(?:<[^>]*>)+\}").unwrap());

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// 改行を`<w:br/>`に置き換えるための断片
const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

/// 分割された`{{` / `}}`を1つにまとめる
fn join_split_braces(xml: &str) -> String {
    let xml = SPLIT_OPEN.replace_all(xml, "{{");
    SPLIT_CLOSE.replace_all(&xml, "}}").into_owned()
}

/// プレースホルダー内部からキー名を取り出す
///
/// タグと前後の空白を除去し、識別子として妥当な場合のみ返します。
fn placeholder_key(inner: &str) -> Option<String> {
    let key = TAG.replace_all(inner, "");
    let key = key.trim();
    IDENT.is_match(key).then(|| key.to_string())
}

/// XML中のプレースホルダーを置換
///
/// * コンテキストに存在しないキーは空文字列になります
/// * 値はXMLエスケープされ、改行は`<w:br/>`として挿入されます
/// * 識別子として解釈できないプレースホルダー（`{{ a + b }}`など）はそのまま残します
pub(crate) fn substitute(xml: &str, context: &Context) -> String {
    if !xml.contains('{') {
        return xml.to_string();
    }

    let xml = join_split_braces(xml);
    PLACEHOLDER
        .replace_all(&xml, |caps: &Captures| match placeholder_key(&caps[1]) {
            Some(key) => {
                let value = context.get(&key).unwrap_or("");
                escape(value).replace('\n', LINE_BREAK)
            }
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// XML中で参照されているプレースホルダーのキー一覧
pub(crate) fn placeholders(xml: &str) -> BTreeSet<String> {
    let xml = join_split_braces(xml);
    PLACEHOLDER
        .captures_iter(&xml)
        .filter_map(|caps| placeholder_key(&caps[1]))
        .collect()
}
