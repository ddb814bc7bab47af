//! XMP packet model
//!
//! The packet is held as a light element tree built from `quick-xml` events.
//! Anything the editor does not touch (processing instructions, comments,
//! padding, attribute spelling and escaping) is written back as it was read.
//! Namespaces are resolved through in-scope `xmlns` declarations, so a
//! property is found by its namespace URI whatever prefix the producer chose.
//!
//! Edits never add editor attribution: no `xmp:MetadataDate`, no
//! `xmp:ModifyDate` and no `x:xmptk` toolkit stamp is written.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::XmpError;

pub const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
pub const NS_XMP: &str = "http://ns.adobe.com/xap/1.0/";
pub const NS_PDF: &str = "http://ns.adobe.com/pdf/1.3/";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// No x:xmptk attribute: a fresh packet must not name the tool that made it
const EMPTY_PACKET: &str = "<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>
<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">
 <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">
  <rdf:Description rdf:about=\"\"/>
 </rdf:RDF>
</x:xmpmeta>
<?xpacket end=\"w\"?>";

/// A property in one of the standard namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub namespace: &'static str,
    pub prefix: &'static str,
    pub name: &'static str,
}

pub const DC_CREATOR: Property = Property { namespace: NS_DC, prefix: "dc", name: "creator" };
pub const XMP_CREATOR_TOOL: Property = Property { namespace: NS_XMP, prefix: "xmp", name: "CreatorTool" };
pub const PDF_PRODUCER: Property = Property { namespace: NS_PDF, prefix: "pdf", name: "Producer" };
pub const XMP_METADATA_DATE: Property = Property { namespace: NS_XMP, prefix: "xmp", name: "MetadataDate" };

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Text(BytesText<'static>),
    Markup(Event<'static>),
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    /// Raw (still escaped) attribute values
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    self_closing: bool,
    /// Start tag as read, reused on output until the attributes change
    raw: Option<BytesStart<'static>>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
            raw: None,
        }
    }

    fn touch(&mut self) {
        self.raw = None;
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self, XmpError> {
        let name = utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            attributes.push((
                utf8(attribute.key.as_ref())?.to_string(),
                utf8(&attribute.value)?.to_string(),
            ));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
            raw: Some(start.clone().into_owned()),
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == *key)
            .map(|(_, v)| v.as_str())
    }

    fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children.iter().enumerate().filter_map(|(i, node)| match node {
            Node::Element(el) => Some((i, el)),
            _ => None,
        })
    }

    /// Unescaped text directly inside this element
    fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => text.unescape().ok().map(Cow::into_owned),
                _ => None,
            })
            .collect()
    }
}

/// In-scope namespace bindings, innermost last
#[derive(Debug, Clone, Default)]
struct Scope(Vec<(String, String)>);

impl Scope {
    fn enter(&self, element: &Element) -> Scope {
        let mut bindings = self.0.clone();
        for (key, value) in &element.attributes {
            if key == "xmlns" {
                bindings.push((String::new(), value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                bindings.push((prefix.to_string(), value.clone()));
            }
        }
        Scope(bindings)
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// A prefix currently bound to `namespace`, if any
    fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .filter(|(_, uri)| uri == namespace)
            .map(|(p, _)| p.as_str())
            .find(|p| self.resolve(p) == Some(namespace))
    }

    fn element_is(&self, qname: &str, namespace: &str, local: &str) -> bool {
        let (prefix, name) = split_qname(qname);
        name == local && self.resolve(prefix) == Some(namespace)
    }

    /// Unprefixed attributes have no namespace
    fn attribute_is(&self, qname: &str, namespace: &str, local: &str) -> bool {
        let (prefix, name) = split_qname(qname);
        !prefix.is_empty() && name == local && self.resolve(prefix) == Some(namespace)
    }
}

/// Where an existing property value lives
enum Location {
    Element { description: usize, child: usize },
    Attribute { description: usize, key: String },
}

/// Value written into a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Seq(Vec<String>),
}

/// A parsed XMP packet
#[derive(Debug, Clone)]
pub struct XmpPacket {
    nodes: Vec<Node>,
    bom: bool,
}

impl XmpPacket {
    /// An empty packet with a single `rdf:Description`
    pub fn empty() -> Result<Self, XmpError> {
        Self::parse(EMPTY_PACKET.as_bytes())
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, XmpError> {
        let (bom, body) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (true, rest),
            None => (false, bytes),
        };
        let text = std::str::from_utf8(body).map_err(|_| XmpError::Encoding)?;

        let mut reader = Reader::from_str(text);
        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Start(start) => {
                    open.push(Element::from_start(&start, false)?);
                    continue;
                }
                Event::End(_) => Node::Element(open.pop().ok_or(XmpError::Unbalanced)?),
                Event::Empty(start) => Node::Element(Element::from_start(&start, true)?),
                Event::Text(text) => Node::Text(text.into_owned()),
                Event::Eof => break,
                other => Node::Markup(other.into_owned()),
            };
            match open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if !open.is_empty() {
            return Err(XmpError::Unbalanced);
        }

        let packet = Self { nodes, bom };
        if packet.rdf_root().is_none() {
            return Err(XmpError::MissingRdf);
        }
        Ok(packet)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, XmpError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        let body = writer.into_inner();

        let mut bytes = Vec::with_capacity(body.len() + UTF8_BOM.len());
        if self.bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Set a simple text property
    pub fn set_text(&mut self, property: Property, value: &str) {
        self.set(property, PropertyValue::Text(value.to_string()));
    }

    /// Set an ordered array property
    pub fn set_seq(&mut self, property: Property, items: &[&str]) {
        self.set(
            property,
            PropertyValue::Seq(items.iter().map(|s| s.to_string()).collect()),
        );
    }

    /// Set `property` wherever it occurs; a packet without it gets it in the
    /// first rdf:Description
    pub fn set(&mut self, property: Property, value: PropertyValue) {
        let Some((rdf_path, rdf_scope)) = self.rdf_root() else {
            return;
        };
        let locations = self.locate_all(property);
        let Some(rdf) = element_at_mut(&mut self.nodes, &rdf_path) else {
            return;
        };

        if locations.is_empty() {
            let description = first_description(rdf, &rdf_scope).unwrap_or_else(|| {
                let rdf_prefix = split_qname(&rdf.name).0.to_string();
                let mut desc = Element::new(qualify(&rdf_prefix, "Description"));
                desc.attributes.push((qualify(&rdf_prefix, "about"), String::new()));
                rdf.children.push(Node::Element(desc));
                rdf.children.len() - 1
            });
            if let Some(Node::Element(desc)) = rdf.children.get_mut(description) {
                let scope = rdf_scope.enter(desc);
                append_property(desc, &scope, property, &value);
            }
            return;
        }

        for location in &locations {
            match location {
                Location::Attribute { description, key } => {
                    let Some(Node::Element(desc)) = rdf.children.get_mut(*description) else {
                        continue;
                    };
                    desc.touch();
                    match &value {
                        PropertyValue::Text(text) => {
                            if let Some(slot) = desc.attributes.iter_mut().find(|(k, _)| *k == *key) {
                                slot.1 = escape(text.as_str()).into_owned();
                            }
                        }
                        // Arrays cannot live in attributes, move it to an element
                        PropertyValue::Seq(_) => {
                            desc.attributes.retain(|(k, _)| *k != *key);
                            let has_element = locations.iter().any(|other| {
                                matches!(other, Location::Element { description: d, .. } if d == description)
                            });
                            if !has_element {
                                let scope = rdf_scope.enter(desc);
                                append_property(desc, &scope, property, &value);
                            }
                        }
                    }
                }
                Location::Element { description, child } => {
                    let Some(Node::Element(desc)) = rdf.children.get_mut(*description) else {
                        continue;
                    };
                    let desc_scope = rdf_scope.enter(desc);
                    if let Some(Node::Element(target)) = desc.children.get_mut(*child) {
                        let scope = desc_scope.enter(target);
                        target.attributes.retain(|(k, _)| k == "xmlns" || k.starts_with("xmlns:"));
                        target.touch();
                        target.self_closing = false;
                        target.children = value_nodes(&scope, &value);
                    }
                }
            }
        }
    }

    /// Text of a simple property, or the first item of an array property
    pub fn get_text(&self, property: Property) -> Option<String> {
        match self.get(property)? {
            PropertyValue::Text(text) => Some(text),
            PropertyValue::Seq(items) => items.into_iter().next(),
        }
    }

    /// Items of an array property; a simple value reads as one item
    pub fn get_seq(&self, property: Property) -> Vec<String> {
        match self.get(property) {
            Some(PropertyValue::Seq(items)) => items,
            Some(PropertyValue::Text(text)) => vec![text],
            None => Vec::new(),
        }
    }

    pub fn get(&self, property: Property) -> Option<PropertyValue> {
        let (rdf_path, rdf_scope) = self.rdf_root()?;
        let rdf = element_at(&self.nodes, &rdf_path)?;

        match self.locate(property)? {
            Location::Attribute { description, key } => {
                let Some(Node::Element(desc)) = rdf.children.get(description) else {
                    return None;
                };
                let raw = desc.attribute(&key)?;
                let text = unescape(raw).map(Cow::into_owned).unwrap_or_else(|_| raw.to_string());
                Some(PropertyValue::Text(text))
            }
            Location::Element { description, child } => {
                let Some(Node::Element(desc)) = rdf.children.get(description) else {
                    return None;
                };
                let Some(Node::Element(target)) = desc.children.get(child) else {
                    return None;
                };
                let scope = rdf_scope.enter(desc).enter(target);
                let container = target.child_elements().map(|(_, el)| el).find(|el| {
                    ["Seq", "Bag", "Alt"]
                        .iter()
                        .any(|kind| scope.element_is(&el.name, NS_RDF, kind))
                });
                match container {
                    Some(list) => {
                        let list_scope = scope.enter(list);
                        let items = list
                            .child_elements()
                            .filter(|(_, li)| list_scope.element_is(&li.name, NS_RDF, "li"))
                            .map(|(_, li)| li.text())
                            .collect();
                        Some(PropertyValue::Seq(items))
                    }
                    None => Some(PropertyValue::Text(target.text())),
                }
            }
        }
    }

    pub fn has(&self, property: Property) -> bool {
        self.locate(property).is_some()
    }

    /// Path of the `rdf:RDF` element and the scope inside it
    fn rdf_root(&self) -> Option<(Vec<usize>, Scope)> {
        find_element(&self.nodes, &Scope::default(), &mut Vec::new(), &|scope, el| {
            scope.element_is(&el.name, NS_RDF, "RDF")
        })
    }

    /// First occurrence of `property`, in document order
    fn locate(&self, property: Property) -> Option<Location> {
        self.locate_all(property).into_iter().next()
    }

    /// Every occurrence of `property` across the rdf:Description elements
    fn locate_all(&self, property: Property) -> Vec<Location> {
        let mut found = Vec::new();
        let Some((rdf_path, rdf_scope)) = self.rdf_root() else {
            return found;
        };
        let Some(rdf) = element_at(&self.nodes, &rdf_path) else {
            return found;
        };

        for (index, desc) in rdf.child_elements() {
            if !rdf_scope.element_is(&desc.name, NS_RDF, "Description") {
                continue;
            }
            let scope = rdf_scope.enter(desc);
            found.extend(
                desc.attributes
                    .iter()
                    .filter(|(k, _)| scope.attribute_is(k, property.namespace, property.name))
                    .map(|(key, _)| Location::Attribute {
                        description: index,
                        key: key.clone(),
                    }),
            );
            found.extend(
                desc.child_elements()
                    .filter(|(_, el)| scope.enter(el).element_is(&el.name, property.namespace, property.name))
                    .map(|(child, _)| Location::Element {
                        description: index,
                        child,
                    }),
            );
        }
        found
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, XmpError> {
    std::str::from_utf8(bytes).map_err(|_| XmpError::Encoding)
}

fn split_qname(qname: &str) -> (&str, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qname),
    }
}

fn qualify(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn find_element(
    nodes: &[Node],
    scope: &Scope,
    path: &mut Vec<usize>,
    matches: &dyn Fn(&Scope, &Element) -> bool,
) -> Option<(Vec<usize>, Scope)> {
    for (index, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else { continue };
        path.push(index);
        let inner = scope.enter(el);
        if matches(&inner, el) {
            return Some((path.clone(), inner));
        }
        if let Some(found) = find_element(&el.children, &inner, path, matches) {
            return Some(found);
        }
        path.pop();
    }
    None
}

fn element_at<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Element> {
    let (first, rest) = path.split_first()?;
    let Node::Element(el) = nodes.get(*first)? else {
        return None;
    };
    if rest.is_empty() {
        Some(el)
    } else {
        element_at(&el.children, rest)
    }
}

fn element_at_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut Element> {
    let (first, rest) = path.split_first()?;
    let Node::Element(el) = nodes.get_mut(*first)? else {
        return None;
    };
    if rest.is_empty() {
        Some(el)
    } else {
        element_at_mut(&mut el.children, rest)
    }
}

fn first_description(rdf: &Element, rdf_scope: &Scope) -> Option<usize> {
    rdf.child_elements()
        .find(|(_, el)| rdf_scope.element_is(&el.name, NS_RDF, "Description"))
        .map(|(i, _)| i)
}

/// Prefix bound to `namespace` at `scope`, declaring one on `element` when missing
fn ensure_prefix(element: &mut Element, scope: &Scope, namespace: &str, preferred: &str) -> String {
    if let Some(prefix) = scope.prefix_for(namespace) {
        return prefix.to_string();
    }
    let mut prefix = preferred.to_string();
    let mut counter = 1;
    while scope.resolve(&prefix).is_some()
        || element.attribute(&format!("xmlns:{}", prefix)).is_some()
    {
        prefix = format!("{}{}", preferred, counter);
        counter += 1;
    }
    element.touch();
    element
        .attributes
        .push((format!("xmlns:{}", prefix), escape(namespace).into_owned()));
    prefix
}

fn append_property(desc: &mut Element, scope: &Scope, property: Property, value: &PropertyValue) {
    let prefix = ensure_prefix(desc, scope, property.namespace, property.prefix);
    let rdf_prefix = match value {
        PropertyValue::Seq(_) => ensure_prefix(desc, scope, NS_RDF, "rdf"),
        PropertyValue::Text(_) => String::new(),
    };

    let mut element = Element::new(qualify(&prefix, property.name));
    element.children = value_nodes_with(&rdf_prefix, value);

    desc.self_closing = false;
    desc.children.push(Node::Element(element));
}

fn value_nodes(scope: &Scope, value: &PropertyValue) -> Vec<Node> {
    let rdf_prefix = scope.prefix_for(NS_RDF).unwrap_or("rdf").to_string();
    value_nodes_with(&rdf_prefix, value)
}

fn value_nodes_with(rdf_prefix: &str, value: &PropertyValue) -> Vec<Node> {
    match value {
        PropertyValue::Text(text) => vec![Node::Text(BytesText::new(text).into_owned())],
        PropertyValue::Seq(items) => {
            let mut seq = Element::new(qualify(rdf_prefix, "Seq"));
            seq.children = items
                .iter()
                .map(|item| {
                    let mut li = Element::new(qualify(rdf_prefix, "li"));
                    li.children = vec![Node::Text(BytesText::new(item).into_owned())];
                    Node::Element(li)
                })
                .collect();
            vec![Node::Element(seq)]
        }
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), XmpError> {
    match node {
        Node::Element(el) => {
            let start = match &el.raw {
                Some(raw) => raw.clone(),
                None => {
                    let mut start = BytesStart::new(el.name.as_str());
                    for (key, value) in &el.attributes {
                        start.push_attribute((key.as_bytes(), value.as_bytes()));
                    }
                    start
                }
            };
            if el.self_closing && el.children.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for child in &el.children {
                    write_node(writer, child)?;
                }
                writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
            }
        }
        Node::Text(text) => writer.write_event(Event::Text(text.clone()))?,
        Node::Markup(event) => writer.write_event(event)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACROBAT_PACKET: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/" x:xmptk="Adobe XMP Core 5.1.0">
   <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
      <rdf:Description rdf:about=""
            xmlns:xmp="http://ns.adobe.com/xap/1.0/"
            xmlns:dc="http://purl.org/dc/elements/1.1/"
            xmlns:pdf="http://ns.adobe.com/pdf/1.3/">
         <xmp:CreateDate>2021-03-04T10:00:00+01:00</xmp:CreateDate>
         <xmp:CreatorTool>Microsoft Word</xmp:CreatorTool>
         <dc:format>application/pdf</dc:format>
         <dc:creator>
            <rdf:Seq>
               <rdf:li>Jane Doe</rdf:li>
               <rdf:li>John Roe</rdf:li>
            </rdf:Seq>
         </dc:creator>
         <!-- keep me -->
         <pdf:Producer>Word &amp; Friends</pdf:Producer>
      </rdf:Description>
   </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

    #[test]
    fn reads_existing_values() {
        let packet = XmpPacket::parse(ACROBAT_PACKET.as_bytes()).unwrap();
        assert_eq!(packet.get_seq(DC_CREATOR), vec!["Jane Doe", "John Roe"]);
        assert_eq!(packet.get_text(XMP_CREATOR_TOOL).as_deref(), Some("Microsoft Word"));
        assert_eq!(packet.get_text(PDF_PRODUCER).as_deref(), Some("Word & Friends"));
    }

    #[test]
    fn untouched_packet_round_trips_byte_for_byte() {
        let packet = XmpPacket::parse(ACROBAT_PACKET.as_bytes()).unwrap();
        assert_eq!(packet.to_bytes().unwrap(), ACROBAT_PACKET.as_bytes());
    }

    #[test]
    fn replaces_targets_and_keeps_the_rest() {
        let mut packet = XmpPacket::parse(ACROBAT_PACKET.as_bytes()).unwrap();
        packet.set_seq(DC_CREATOR, &["Adobe User"]);
        packet.set_text(XMP_CREATOR_TOOL, "Adobe Acrobat Pro");
        packet.set_text(PDF_PRODUCER, "Adobe PDF Library");

        let reparsed = XmpPacket::parse(&packet.to_bytes().unwrap()).unwrap();
        assert_eq!(reparsed.get_seq(DC_CREATOR), vec!["Adobe User"]);
        assert_eq!(reparsed.get_text(XMP_CREATOR_TOOL).as_deref(), Some("Adobe Acrobat Pro"));
        assert_eq!(reparsed.get_text(PDF_PRODUCER).as_deref(), Some("Adobe PDF Library"));

        let text = String::from_utf8(packet.to_bytes().unwrap()).unwrap();
        assert!(text.contains("<xmp:CreateDate>2021-03-04T10:00:00+01:00</xmp:CreateDate>"));
        assert!(text.contains("<dc:format>application/pdf</dc:format>"));
        assert!(text.contains("<!-- keep me -->"));
        assert!(text.contains(r#"x:xmptk="Adobe XMP Core 5.1.0""#));
        assert!(text.ends_with(r#"<?xpacket end="w"?>"#));
        assert!(!reparsed.has(XMP_METADATA_DATE));
    }

    #[test]
    fn attribute_form_is_updated_in_place() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="" xmlns:p="http://ns.adobe.com/pdf/1.3/" p:Producer="Old" p:Keywords="a, b"/></rdf:RDF></x:xmpmeta>"#;
        let mut packet = XmpPacket::parse(xml.as_bytes()).unwrap();
        packet.set_text(PDF_PRODUCER, "New <Lib>");

        let text = String::from_utf8(packet.to_bytes().unwrap()).unwrap();
        assert!(text.contains(r#"p:Producer="New &lt;Lib&gt;""#));
        assert!(text.contains(r#"p:Keywords="a, b""#));
        assert_eq!(packet.get_text(PDF_PRODUCER).as_deref(), Some("New <Lib>"));
    }

    #[test]
    fn every_description_carrying_a_target_is_updated() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="" xmlns:pdf="http://ns.adobe.com/pdf/1.3/"><pdf:Producer>Old One</pdf:Producer></rdf:Description><rdf:Description rdf:about="" xmlns:pdf="http://ns.adobe.com/pdf/1.3/" xmlns:dc="http://purl.org/dc/elements/1.1/" pdf:Producer="Old Two" dc:creator="Old Three"/></rdf:RDF>"#;
        let mut packet = XmpPacket::parse(xml.as_bytes()).unwrap();
        packet.set_text(PDF_PRODUCER, "New Lib");
        packet.set_seq(DC_CREATOR, &["New Author"]);

        let text = String::from_utf8(packet.to_bytes().unwrap()).unwrap();
        assert!(!text.contains("Old"), "{}", text);
        assert!(text.contains("<pdf:Producer>New Lib</pdf:Producer>"));
        assert!(text.contains(r#"pdf:Producer="New Lib""#));
        assert_eq!(text.matches("<dc:creator>").count(), 1);
        assert_eq!(packet.get_seq(DC_CREATOR), vec!["New Author"]);
    }

    #[test]
    fn missing_properties_are_added_with_declarations() {
        let mut packet = XmpPacket::empty().unwrap();
        packet.set_seq(DC_CREATOR, &["Adobe User"]);
        packet.set_text(XMP_CREATOR_TOOL, "Adobe Acrobat Pro");
        packet.set_text(PDF_PRODUCER, "Adobe PDF Library");

        let bytes = packet.to_bytes().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains(r#"xmlns:dc="http://purl.org/dc/elements/1.1/""#));
        assert!(text.contains("<dc:creator><rdf:Seq><rdf:li>Adobe User</rdf:li></rdf:Seq></dc:creator>"));
        assert!(!text.contains("xmptk"));

        let reparsed = XmpPacket::parse(&bytes).unwrap();
        assert_eq!(reparsed.get_seq(DC_CREATOR), vec!["Adobe User"]);
        assert_eq!(reparsed.get_text(PDF_PRODUCER).as_deref(), Some("Adobe PDF Library"));
    }

    #[test]
    fn conflicting_prefix_gets_a_fresh_one() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dc="urn:not-dublin-core"><rdf:Description rdf:about=""/></rdf:RDF>"#;
        let mut packet = XmpPacket::parse(xml.as_bytes()).unwrap();
        packet.set_seq(DC_CREATOR, &["A"]);

        let text = String::from_utf8(packet.to_bytes().unwrap()).unwrap();
        assert!(text.contains(r#"xmlns:dc1="http://purl.org/dc/elements/1.1/""#));
        assert!(text.contains("<dc1:creator>"));
        assert_eq!(packet.get_seq(DC_CREATOR), vec!["A"]);
    }

    #[test]
    fn creates_description_when_rdf_is_empty() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"></rdf:RDF></x:xmpmeta>"#;
        let mut packet = XmpPacket::parse(xml.as_bytes()).unwrap();
        packet.set_text(XMP_CREATOR_TOOL, "Tool");

        let text = String::from_utf8(packet.to_bytes().unwrap()).unwrap();
        assert!(text.contains(r#"<rdf:Description rdf:about="" xmlns:xmp="http://ns.adobe.com/xap/1.0/">"#));
        assert_eq!(packet.get_text(XMP_CREATOR_TOOL).as_deref(), Some("Tool"));
    }

    #[test]
    fn rejects_packets_without_rdf() {
        assert!(matches!(
            XmpPacket::parse(b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>"),
            Err(XmpError::MissingRdf)
        ));
        assert!(XmpPacket::parse(b"<rdf:RDF").is_err());
        assert!(matches!(XmpPacket::parse(b"\xff\xfe<"), Err(XmpError::Encoding)));
    }

    #[test]
    fn bom_is_preserved() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(EMPTY_PACKET.as_bytes());
        let packet = XmpPacket::parse(&bytes).unwrap();
        assert!(packet.to_bytes().unwrap().starts_with(UTF8_BOM));
    }
}
