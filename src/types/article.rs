use std::collections::BTreeMap;

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{DocId, ImageIndex};

/// Category label of a named entity, as produced by the annotator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Other(String),
}

impl EntityLabel {
    pub fn as_str(&self) -> &str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Other(s) => s,
        }
    }
}

impl From<String> for EntityLabel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PERSON" => EntityLabel::Person,
            "ORG" => EntityLabel::Org,
            "GPE" => EntityLabel::Gpe,
            _ => EntityLabel::Other(s),
        }
    }
}

impl From<EntityLabel> for String {
    fn from(l: EntityLabel) -> Self {
        l.as_str().to_string()
    }
}

impl JsonSchema for EntityLabel {
    fn schema_name() -> String {
        "EntityLabel".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

/// A labeled span. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NamedEntity {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub text: String,
    pub label: EntityLabel,
}

impl NamedEntity {
    pub fn new(text: &str, label: EntityLabel) -> Self {
        Self {
            start: 0,
            end: text.len(),
            text: text.to_string(),
            label,
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "start": self.start,
            "end": self.end,
            "text": self.text,
            "label": self.label.as_str(),
        })
    }
}

/// Per-image caption annotations.
///
/// Lists are indexed by image position, maps by image key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CaptionNer {
    ByPosition(Vec<Vec<NamedEntity>>),
    ByKey(BTreeMap<String, Vec<NamedEntity>>),
}

impl CaptionNer {
    pub fn get(&self, index: &ImageIndex) -> Option<&[NamedEntity]> {
        match self {
            CaptionNer::ByPosition(list) => index
                .position()
                .and_then(|p| list.get(p))
                .map(Vec::as_slice),
            CaptionNer::ByKey(map) => map.get(index.key().as_ref()).map(Vec::as_slice),
        }
    }
}

/// Article headline. Only `main` is read, other variants (`kicker`, `print_headline`, ...) are carried along.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Headline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Which article fields a lookup should return.
///
/// An empty projection returns every field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleProjection {
    fields: Vec<String>,
}

impl ArticleProjection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if !fields.iter().any(|f| f == "_id") {
            fields.insert(0, "_id".to_string());
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_all(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn includes(&self, field: &str) -> bool {
        self.is_all() || self.fields.iter().any(|f| f == field)
    }
}

/// A news article.
///
/// Text fields (`context`, `context_abstract`, ...) and their `<key>_ner`
/// annotation lists are keyed by field name, since readers pick the context field at runtime.
/// Fields this crate does not interpret are kept as is so that saving an article does not lose them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArticleSer", into = "ArticleSer")]
pub struct Article {
    id: DocId,
    images: BTreeMap<String, String>,
    caption_ner: Option<CaptionNer>,
    web_url: Option<String>,
    abstract_text: Option<String>,
    image_path: Option<String>,
    headline: Option<Headline>,
    texts: BTreeMap<String, String>,
    annotations: BTreeMap<String, Vec<NamedEntity>>,
    extra: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, JsonSchema)]
/// Serializable version of [Article].
struct ArticleSer {
    #[serde(rename = "_id")]
    id: DocId,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    images: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption_ner: Option<CaptionNer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    web_url: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    headline: Option<Headline>,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl TryFrom<ArticleSer> for Article {
    type Error = serde_json::Error;

    fn try_from(a: ArticleSer) -> Result<Self, Self::Error> {
        let mut texts: BTreeMap<String, String> = BTreeMap::new();
        let mut annotations: BTreeMap<String, Vec<NamedEntity>> = BTreeMap::new();
        let mut extra: BTreeMap<String, Value> = BTreeMap::new();

        for (key, value) in a.fields {
            let is_ner = key.ends_with("_ner");
            match value {
                Value::Array(_) if is_ner => {
                    let stem = key[..key.len() - "_ner".len()].to_string();
                    let entities: Vec<NamedEntity> = serde_json::from_value(value)?;
                    annotations.insert(stem, entities);
                }
                Value::String(text) if !is_ner => {
                    texts.insert(key, text);
                }
                value => {
                    extra.insert(key, value);
                }
            }
        }

        Ok(Self {
            id: a.id,
            images: a.images,
            caption_ner: a.caption_ner,
            web_url: a.web_url,
            abstract_text: a.abstract_text,
            image_path: a.image_path,
            headline: a.headline,
            texts,
            annotations,
            extra,
        })
    }
}

impl From<Article> for ArticleSer {
    fn from(a: Article) -> Self {
        let mut fields = a.extra;
        fields.extend(a.texts.into_iter().map(|(k, v)| (k, Value::String(v))));
        fields.extend(a.annotations.into_iter().map(|(k, v)| {
            let list = v.iter().map(NamedEntity::to_value).collect();
            (format!("{k}_ner"), Value::Array(list))
        }));

        Self {
            id: a.id,
            images: a.images,
            caption_ner: a.caption_ner,
            web_url: a.web_url,
            abstract_text: a.abstract_text,
            image_path: a.image_path,
            headline: a.headline,
            fields,
        }
    }
}

impl JsonSchema for Article {
    fn schema_name() -> String {
        "Article".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        ArticleSer::json_schema(gen)
    }
}

impl Article {
    pub fn new(id: DocId) -> Self {
        Self {
            id,
            images: BTreeMap::new(),
            caption_ner: None,
            web_url: None,
            abstract_text: None,
            image_path: None,
            headline: None,
            texts: BTreeMap::new(),
            annotations: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, key: &str, text: &str) -> Self {
        self.set_text(key, Some(text.to_string()));
        self
    }

    pub fn with_annotations(mut self, key: &str, entities: Vec<NamedEntity>) -> Self {
        self.set_annotations(key, Some(entities));
        self
    }

    pub fn with_image(mut self, index: &str, caption: &str) -> Self {
        self.images.insert(index.to_string(), caption.to_string());
        self
    }

    pub fn with_caption_ner(mut self, caption_ner: CaptionNer) -> Self {
        self.caption_ner = Some(caption_ner);
        self
    }

    pub fn with_web_url(mut self, url: &str) -> Self {
        self.web_url = Some(url.to_string());
        self
    }

    pub fn with_abstract(mut self, text: &str) -> Self {
        self.abstract_text = Some(text.to_string());
        self
    }

    pub fn with_image_path(mut self, path: &str) -> Self {
        self.image_path = Some(path.to_string());
        self
    }

    pub fn with_headline(mut self, main: &str) -> Self {
        self.headline = Some(Headline {
            main: Some(main.to_string()),
            ..Default::default()
        });
        self
    }

    pub fn id(&self) -> &DocId {
        &self.id
    }

    /// Text field `key`, if present and not null.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// Annotations of text field `key` (stored under `<key>_ner`).
    pub fn annotations(&self, key: &str) -> Option<&[NamedEntity]> {
        self.annotations.get(key).map(Vec::as_slice)
    }

    pub fn images(&self) -> &BTreeMap<String, String> {
        &self.images
    }

    pub fn caption(&self, index: &ImageIndex) -> Option<&str> {
        self.images.get(index.key().as_ref()).map(String::as_str)
    }

    pub fn caption_annotations(&self, index: &ImageIndex) -> Option<&[NamedEntity]> {
        self.caption_ner.as_ref().and_then(|ner| ner.get(index))
    }

    pub fn web_url(&self) -> Option<&str> {
        self.web_url.as_deref()
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    pub fn headline_main(&self) -> Option<&str> {
        self.headline.as_ref().and_then(|h| h.main.as_deref())
    }

    /// Sets text field `key`. [None] stores an explicit null.
    pub fn set_text(&mut self, key: &str, text: Option<String>) {
        match text {
            Some(text) => {
                self.extra.remove(key);
                self.texts.insert(key.to_string(), text);
            }
            None => {
                self.texts.remove(key);
                self.extra.insert(key.to_string(), Value::Null);
            }
        }
    }

    /// Sets the `<key>_ner` list. [None] stores an explicit null.
    pub fn set_annotations(&mut self, key: &str, entities: Option<Vec<NamedEntity>>) {
        let field = format!("{key}_ner");
        match entities {
            Some(entities) => {
                self.extra.remove(&field);
                self.annotations.insert(key.to_string(), entities);
            }
            None => {
                self.annotations.remove(key);
                self.extra.insert(field, Value::Null);
            }
        }
    }

    /// Copy of the article restricted to the projected fields.
    pub fn project(&self, projection: &ArticleProjection) -> Article {
        if projection.is_all() {
            return self.clone();
        }
        let keep = |field: &str| -> bool { projection.includes(field) };
        let keep_opt = |field: &str, value: &Option<String>| {
            if keep(field) {
                value.clone()
            } else {
                None
            }
        };

        Article {
            id: self.id.clone(),
            images: if keep("images") {
                self.images.clone()
            } else {
                BTreeMap::new()
            },
            caption_ner: if keep("caption_ner") {
                self.caption_ner.clone()
            } else {
                None
            },
            web_url: keep_opt("web_url", &self.web_url),
            abstract_text: keep_opt("abstract", &self.abstract_text),
            image_path: keep_opt("image_path", &self.image_path),
            headline: if keep("headline") {
                self.headline.clone()
            } else {
                None
            },
            texts: self
                .texts
                .iter()
                .filter(|(k, _)| keep(k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            annotations: self
                .annotations
                .iter()
                .filter(|(k, _)| keep(format!("{k}_ner").as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            extra: self
                .extra
                .iter()
                .filter(|(k, _)| keep(k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen_article() -> &'static str {
        r#"{
            "_id": 7,
            "context": "Alice met Bob today.",
            "images": {"0": "Alice and Bob"},
            "context_ner": [
                {"start": 0, "end": 5, "text": "Alice", "label": "PERSON"},
                {"start": 10, "end": 13, "text": "Bob", "label": "PERSON"}
            ],
            "caption_ner": [[{"text": "Alice", "label": "PERSON"}]],
            "context_abstract": null,
            "pub_date": "2019-06-01",
            "language": "en"
        }"#
    }

    #[test]
    fn test_deserialize() {
        let a: Article = serde_json::from_str(gen_article()).unwrap();
        assert_eq!(a.id(), &DocId::Int(7));
        assert_eq!(a.text("context"), Some("Alice met Bob today."));
        assert_eq!(a.text("context_abstract"), None);
        assert_eq!(a.annotations("context").unwrap().len(), 2);
        assert_eq!(a.annotations("context").unwrap()[0].label, EntityLabel::Person);
        assert_eq!(a.caption(&ImageIndex::Position(0)), Some("Alice and Bob"));
        assert_eq!(
            a.caption_annotations(&ImageIndex::Key("0".to_string()))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(a.web_url(), None);
    }

    #[test]
    fn test_headline_variants_kept() {
        let raw = r#"{"_id": 1, "headline": {"main": "M", "kicker": "K", "print_headline": "P"}}"#;
        let a: Article = serde_json::from_str(raw).unwrap();
        assert_eq!(a.headline_main(), Some("M"));

        let back = serde_json::to_value(&a).unwrap();
        assert_eq!(
            back["headline"],
            json!({"main": "M", "kicker": "K", "print_headline": "P"})
        );
    }

    #[test]
    fn test_roundtrip_keeps_unknown_fields() {
        let a: Article = serde_json::from_str(gen_article()).unwrap();
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["pub_date"], "2019-06-01");
        assert_eq!(v["context_abstract"], Value::Null);
        assert_eq!(v["context_ner"][1]["text"], "Bob");
        let b: Article = serde_json::from_value(v).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_caption_ner_by_key() {
        let raw = r#"{"_id": "abc", "caption_ner": {"1": [{"text": "Carol", "label": "PERSON"}]}}"#;
        let a: Article = serde_json::from_str(raw).unwrap();
        assert!(a.caption_annotations(&ImageIndex::Position(0)).is_none());
        assert_eq!(
            a.caption_annotations(&ImageIndex::Position(1)).unwrap()[0].text,
            "Carol"
        );
    }

    #[test]
    fn test_project() {
        let a: Article = serde_json::from_str(gen_article()).unwrap();
        let p = ArticleProjection::new(["context", "images"]);
        let projected = a.project(&p);
        assert_eq!(projected.text("context"), a.text("context"));
        assert!(projected.annotations("context").is_none());
        assert!(projected.caption_annotations(&ImageIndex::Position(0)).is_none());
        assert_eq!(projected.images().len(), 1);
        assert!(p.includes("_id"));
    }

    #[test]
    fn test_set_text_null() {
        let mut a = Article::new(DocId::Int(1)).with_text("context_abstract", "foo");
        a.set_text("context_abstract", None);
        a.set_annotations("context_abstract", None);
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["context_abstract"], Value::Null);
        assert_eq!(v["context_abstract_ner"], Value::Null);
        assert!(a.text("context_abstract").is_none());
    }
}
