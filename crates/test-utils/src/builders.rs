#![allow(dead_code)]

use serde_json::{json, Map, Value};

use saveprobe::config::{Item, Widget};

/// Builder for validated `Item`s, for tests that bypass config parsing.
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn int(name: &str, min: i64, max: i64) -> Self {
        Self::with_widget(name, Widget::Int { min, max })
    }

    pub fn boolean(name: &str, on_value: i64, off_value: i64) -> Self {
        Self::with_widget(name, Widget::Bool { on_value, off_value })
    }

    pub fn list(name: &str, entries: &[(i64, &str)]) -> Self {
        Self::with_widget(
            name,
            Widget::List {
                values: entries.iter().map(|(v, _)| *v).collect(),
                names: entries.iter().map(|(_, n)| n.to_string()).collect(),
            },
        )
    }

    fn with_widget(name: &str, widget: Widget) -> Self {
        Self {
            item: Item {
                name: name.to_string(),
                category: None,
                str_args: Vec::new(),
                int_args: Vec::new(),
                widget,
            },
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.item.category = Some(category.to_string());
        self
    }

    pub fn str_arg(mut self, arg: &str) -> Self {
        self.item.str_args.push(arg.to_string());
        self
    }

    pub fn int_arg(mut self, arg: i64) -> Self {
        self.item.int_args.push(arg);
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}

/// Builder for one version entry of a JSON config document.
pub struct VersionJsonBuilder {
    filetype: Option<String>,
    save_file_paths: Vec<String>,
    files: String,
    items: Vec<Value>,
}

impl VersionJsonBuilder {
    pub fn new(filetype: &str, files: &str) -> Self {
        Self {
            filetype: Some(filetype.to_string()),
            save_file_paths: Vec::new(),
            files: files.to_string(),
            items: Vec::new(),
        }
    }

    pub fn without_filetype(mut self) -> Self {
        self.filetype = None;
        self
    }

    pub fn save_path(mut self, pattern: &str) -> Self {
        self.save_file_paths.push(pattern.to_string());
        self
    }

    /// `int` item addressed by a single string argument.
    pub fn int_item(mut self, name: &str, key: &str, min: i64, max: i64) -> Self {
        self.items.push(json!({
            "name": name,
            "strArgs": [key],
            "intArgs": [],
            "widget": { "type": "int", "minValue": min, "maxValue": max }
        }));
        self
    }

    /// `bool` item addressed by a single string argument.
    pub fn bool_item(mut self, name: &str, key: &str, on: i64, off: i64) -> Self {
        self.items.push(json!({
            "name": name,
            "strArgs": [key],
            "intArgs": [],
            "widget": { "type": "bool", "onValue": on, "offValue": off }
        }));
        self
    }

    /// `list` item addressed by a single string argument.
    pub fn list_item(mut self, name: &str, key: &str, entries: &[(i64, &str)]) -> Self {
        let values: Vec<i64> = entries.iter().map(|(v, _)| *v).collect();
        let names: Vec<&str> = entries.iter().map(|(_, n)| *n).collect();
        self.items.push(json!({
            "name": name,
            "strArgs": [key],
            "intArgs": [],
            "widget": { "type": "list", "listItemValues": values, "listItemNames": names }
        }));
        self
    }

    /// Arbitrary raw item JSON.
    pub fn raw_item(mut self, item: Value) -> Self {
        self.items.push(item);
        self
    }

    /// Set the category of the most recently added item.
    pub fn in_category(mut self, category: &str) -> Self {
        if let Some(Value::Object(item)) = self.items.last_mut() {
            item.insert("category".to_string(), Value::String(category.to_string()));
        }
        self
    }

    pub fn build(self) -> Value {
        let mut version = Map::new();
        if let Some(filetype) = self.filetype {
            version.insert("filetype".to_string(), Value::String(filetype));
        }
        version.insert("saveFilePaths".to_string(), json!(self.save_file_paths));
        version.insert("files".to_string(), Value::String(self.files));
        version.insert("items".to_string(), Value::Array(self.items));
        Value::Object(version)
    }
}

/// Serialise a terminal config document from `(version name, version JSON)`.
pub fn config_document(versions: Vec<(&str, Value)>) -> String {
    let map: Map<String, Value> = versions
        .into_iter()
        .map(|(name, version)| (name.to_string(), version))
        .collect();
    Value::Object(map).to_string()
}

/// Serialise a redirecting config document.
pub fn redirect_document(target: &str) -> String {
    json!({ "useInstead": target }).to_string()
}
