//! Wire codec selection: json, xml and yaml encode/decode over `serde_json::Value`.

use crate::context::Headers;
use crate::error::{ConfigError, RoaError, RoaResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};
use std::io::Cursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Xml,
    Yaml,
}

impl std::str::FromStr for WireFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(WireFormat::Json),
            "xml" => Ok(WireFormat::Xml),
            "yaml" => Ok(WireFormat::Yaml),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

impl WireFormat {
    pub fn mime(self) -> &'static str {
        match self {
            WireFormat::Json => "application/json",
            WireFormat::Xml => "application/xml",
            WireFormat::Yaml => "text/x-yaml",
        }
    }
}

pub trait WireCodec: Send + Sync {
    fn encode(&self, value: &Value) -> RoaResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> RoaResult<Value>;
}

/// Encoder/decoder pair for one format plus its `Content-Type` header.
pub struct SelectedCodec {
    pub format: WireFormat,
    codec: Box<dyn WireCodec>,
}

impl SelectedCodec {
    pub fn encoder(&self) -> &dyn WireCodec {
        self.codec.as_ref()
    }

    pub fn decoder(&self) -> &dyn WireCodec {
        self.codec.as_ref()
    }

    pub fn content_type_header(&self) -> Headers {
        Headers::from([("Content-Type".to_string(), self.format.mime().to_string())])
    }
}

/// Resolve a configured format name. Unknown names are a configuration error.
pub fn select(format_name: &str) -> Result<SelectedCodec, ConfigError> {
    let format: WireFormat = format_name.parse()?;
    let codec: Box<dyn WireCodec> = match format {
        WireFormat::Json => Box::new(JsonCodec),
        WireFormat::Xml => Box::new(XmlCodec),
        WireFormat::Yaml => Box::new(YamlCodec),
    };
    Ok(SelectedCodec { format, codec })
}

pub struct JsonCodec;

impl WireCodec for JsonCodec {
    fn encode(&self, value: &Value) -> RoaResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| RoaError::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> RoaResult<Value> {
        serde_json::from_slice(bytes).map_err(|e| RoaError::Codec(e.to_string()))
    }
}

pub struct YamlCodec;

impl WireCodec for YamlCodec {
    fn encode(&self, value: &Value) -> RoaResult<Vec<u8>> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| RoaError::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> RoaResult<Value> {
        serde_yaml::from_slice(bytes).map_err(|e| RoaError::Codec(e.to_string()))
    }
}

const XML_ROOT: &str = "root";
const XML_LIST_ITEM: &str = "list-item";
const XML_TYPE_ATTR: &str = "type";
const XML_LIST_TYPE: &str = "list";

/// Element-per-key XML: objects become child elements, arrays become `<list-item>`
/// runs under a `type="list"` element, null becomes an empty element. Leaf text decodes
/// as strings; the serializer brings them to each field's kind.
pub struct XmlCodec;

fn xml_err(e: impl std::fmt::Display) -> RoaError {
    RoaError::Codec(format!("xml: {}", e))
}

impl XmlCodec {
    fn write_value<W: std::io::Write>(writer: &mut Writer<W>, value: &Value) -> RoaResult<()> {
        match value {
            Value::Object(map) => {
                for (key, v) in map {
                    Self::write_element(writer, key, v)?;
                }
            }
            Value::Array(items) => {
                for v in items {
                    Self::write_element(writer, XML_LIST_ITEM, v)?;
                }
            }
            Value::Null => {}
            Value::Bool(b) => {
                let text = if *b { "true" } else { "false" };
                writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_err)?;
            }
            Value::Number(n) => {
                let text = n.to_string();
                writer.write_event(Event::Text(BytesText::new(&text))).map_err(xml_err)?;
            }
            Value::String(s) => {
                writer.write_event(Event::Text(BytesText::new(s))).map_err(xml_err)?;
            }
        }
        Ok(())
    }

    fn write_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, value: &Value) -> RoaResult<()> {
        let mut start = BytesStart::new(name);
        if value.is_array() {
            start.push_attribute((XML_TYPE_ATTR, XML_LIST_TYPE));
        }
        writer.write_event(Event::Start(start)).map_err(xml_err)?;
        Self::write_value(writer, value)?;
        writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)?;
        Ok(())
    }
}

fn leaf_text(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text.to_string())
    }
}

fn is_list_element(e: &BytesStart<'_>) -> RoaResult<bool> {
    Ok(e.try_get_attribute(XML_TYPE_ATTR)
        .map_err(xml_err)?
        .map(|attr| attr.value.as_ref() == XML_LIST_TYPE.as_bytes())
        .unwrap_or(false))
}

struct XmlFrame {
    list: bool,
    children: Vec<(String, Value)>,
    text: String,
}

impl XmlFrame {
    fn new(list: bool) -> Self {
        XmlFrame {
            list,
            children: Vec::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> Value {
        if self.list || (!self.children.is_empty() && self.children.iter().all(|(name, _)| name == XML_LIST_ITEM)) {
            return Value::Array(self.children.into_iter().map(|(_, v)| v).collect());
        }
        if self.children.is_empty() {
            return leaf_text(&self.text);
        }
        let mut map = Map::new();
        for (name, v) in self.children {
            map.insert(name, v);
        }
        Value::Object(map)
    }
}

impl WireCodec for XmlCodec {
    fn encode(&self, value: &Value) -> RoaResult<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_err)?;
        Self::write_element(&mut writer, XML_ROOT, value)?;
        Ok(writer.into_inner().into_inner())
    }

    fn decode(&self, bytes: &[u8]) -> RoaResult<Value> {
        let text = std::str::from_utf8(bytes).map_err(xml_err)?;
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<(String, XmlFrame)> = Vec::new();
        loop {
            match reader.read_event().map_err(xml_err)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    stack.push((name, XmlFrame::new(is_list_element(&e)?)));
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let value = XmlFrame::new(is_list_element(&e)?).into_value();
                    match stack.last_mut() {
                        Some((_, parent)) => parent.children.push((name, value)),
                        None => return Ok(value),
                    }
                }
                Event::Text(e) => {
                    if let Some((_, frame)) = stack.last_mut() {
                        frame.text.push_str(&e.unescape().map_err(xml_err)?);
                    }
                }
                Event::CData(e) => {
                    if let Some((_, frame)) = stack.last_mut() {
                        frame.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(_) => {
                    let (name, frame) = stack.pop().ok_or_else(|| xml_err("unbalanced end tag"))?;
                    let value = frame.into_value();
                    match stack.last_mut() {
                        Some((_, parent)) => parent.children.push((name, value)),
                        None => return Ok(value),
                    }
                }
                Event::Eof => return Err(xml_err("document has no root element")),
                _ => {}
            }
        }
    }
}
