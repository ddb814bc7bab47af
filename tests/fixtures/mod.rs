#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::{write::ZlibEncoder, Compression};
use lopdf::xref::XrefType;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub const SAMPLE_XMP: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/" x:xmptk="Some Toolkit 1.0">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:dc="http://purl.org/dc/elements/1.1/"
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        xmlns:pdf="http://ns.adobe.com/pdf/1.3/"
        xmlns:acme="http://example.com/acme/1.0/">
      <dc:creator><rdf:Seq><rdf:li>Old Author</rdf:li><rdf:li>Second Author</rdf:li></rdf:Seq></dc:creator>
      <dc:description><rdf:Alt><rdf:li xml:lang="x-default">Quarterly figures</rdf:li></rdf:Alt></dc:description>
      <xmp:CreateDate>2020-01-02T03:04:05Z</xmp:CreateDate>
      <xmp:CreatorTool>Old Tool</xmp:CreatorTool>
      <pdf:Producer>Old Producer</pdf:Producer>
      <acme:Ticket>INV-42</acme:Ticket>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

pub struct TestFixtures;

/// What goes into a generated document
#[derive(Default)]
pub struct PdfSpecimen<'a> {
    pub author: Option<&'a str>,
    pub xmp: Option<&'a str>,
    pub compress_content: bool,
    pub xref_stream: bool,
    pub pages: usize,
}

impl TestFixtures {
    /// Two uncompressed pages, a Title and Author "Old", no XMP packet
    pub fn get_minimal_pdf() -> Vec<u8> {
        Self::build(PdfSpecimen {
            author: Some("Old"),
            pages: 2,
            ..Default::default()
        })
    }

    pub fn get_xmp_pdf() -> Vec<u8> {
        Self::build(PdfSpecimen {
            author: Some("Old"),
            xmp: Some(SAMPLE_XMP),
            pages: 1,
            ..Default::default()
        })
    }

    pub fn get_compressed_pdf() -> Vec<u8> {
        Self::build(PdfSpecimen {
            author: None,
            compress_content: true,
            pages: 3,
            ..Default::default()
        })
    }

    /// The minimal document saved with a cross-reference stream
    pub fn get_xref_stream_pdf() -> Vec<u8> {
        Self::build(PdfSpecimen {
            author: Some("Old"),
            xref_stream: true,
            pages: 2,
            ..Default::default()
        })
    }

    /// One page laid out the way current writers do it: a linearization
    /// dictionary, the page tree and Info packed into an object stream, and a
    /// cross-reference stream instead of a table
    pub fn get_modern_pdf() -> Vec<u8> {
        let packed = [
            (3, "<< /Type /Catalog /Pages 5 0 R >>".to_string()),
            (
                4,
                "<< /Type /Page /Parent 5 0 R /MediaBox [0 0 612 792] /Contents 7 0 R >>".to_string(),
            ),
            (5, "<< /Type /Pages /Kids [4 0 R] /Count 1 >>".to_string()),
            (6, "<< /Title (Modern Fixture) /Author (Old) /Producer (Modern Writer) >>".to_string()),
        ];
        let mut index = String::new();
        let mut body = String::new();
        for (id, object) in &packed {
            index.push_str(&format!("{} {} ", id, body.len()));
            body.push_str(object);
            body.push('\n');
        }
        let object_stream = format!("{}{}", index, body);
        let content = page_content(1);

        let mut pdf = b"%PDF-1.5\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let linearized = push_object(
            &mut pdf,
            1,
            "<< /Linearized 1 /L 0 /H [0 0] /O 4 /E 0 /N 1 /T 0 >>",
            None,
        );
        let container = push_object(
            &mut pdf,
            2,
            &format!(
                "<< /Type /ObjStm /N {} /First {} /Length {} >>",
                packed.len(),
                index.len(),
                object_stream.len()
            ),
            Some(object_stream.as_bytes()),
        );
        let contents = push_object(
            &mut pdf,
            7,
            &format!("<< /Length {} >>", content.len()),
            Some(content.as_slice()),
        );

        let xref_offset = pdf.len() as u32;
        let mut entries: Vec<(u8, u32, u16)> = vec![(0, 0, 65535), (1, linearized, 0), (1, container, 0)];
        entries.extend((0..packed.len()).map(|slot| (2, 2, slot as u16)));
        entries.push((1, contents, 0));
        entries.push((1, xref_offset, 0));
        let mut table = Vec::new();
        for (kind, field, extra) in &entries {
            table.push(*kind);
            table.extend_from_slice(&field.to_be_bytes());
            table.extend_from_slice(&extra.to_be_bytes());
        }
        push_object(
            &mut pdf,
            8,
            &format!(
                "<< /Type /XRef /Size {} /W [1 4 2] /Root 3 0 R /Info 6 0 R /Length {} >>",
                entries.len(),
                table.len()
            ),
            Some(table.as_slice()),
        );
        pdf.extend_from_slice(format!("startxref\n{}\n%%EOF\n", xref_offset).as_bytes());
        pdf
    }

    pub fn build(specimen: PdfSpecimen<'_>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for number in 1..=specimen.pages.max(1) {
            let content = page_content(number);
            let stream = if specimen.compress_content {
                Stream::new(dictionary! { "Filter" => "FlateDecode" }, deflate(&content))
            } else {
                Stream::new(Dictionary::new(), content)
            };
            let content_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if let Some(xmp) = specimen.xmp {
            let metadata_id = doc.add_object(Stream::new(
                dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
                xmp.as_bytes().to_vec(),
            ));
            catalog.set("Metadata", Object::Reference(metadata_id));
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = dictionary! {
            "Title" => Object::string_literal("Fixture Document"),
            "CreationDate" => Object::string_literal("D:20200102030405Z"),
            "Producer" => Object::string_literal("Fixture Writer"),
        };
        if let Some(author) = specimen.author {
            info.set("Author", Object::string_literal(author));
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", Object::Reference(info_id));

        if specimen.xref_stream {
            doc.reference_table.cross_reference_type = XrefType::CrossReferenceStream;
        }
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    pub fn get_encrypted_pdf() -> Vec<u8> {
        b"%PDF-1.4
1 0 obj
<<
/Type /Catalog
/Pages 2 0 R
>>
endobj

2 0 obj
<<
/Type /Pages
/Kids [3 0 R]
/Count 1
>>
endobj

3 0 obj
<<
/Type /Page
/Parent 2 0 R
/MediaBox [0 0 612 792]
>>
endobj

4 0 obj
<<
/Filter /Standard
/V 1
/R 2
/O <01234567890123456789012345678901>
/U <01234567890123456789012345678901>
/P -44
>>
endobj

xref
0 5
0000000000 65535 f
0000000010 00000 n
0000000053 00000 n
0000000125 00000 n
0000000200 00000 n
trailer
<<
/Size 5
/Root 1 0 R
/Encrypt 4 0 R
>>
startxref
350
%%EOF"
            .to_vec()
    }

    pub fn get_malformed_pdf() -> Vec<u8> {
        b"This is not a valid PDF file".to_vec()
    }

    pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }
}

pub fn page_content(number: usize) -> Vec<u8> {
    format!("BT /F1 24 Tf 72 700 Td (Page {}) Tj ET", number).into_bytes()
}

/// Append `id 0 obj`, returning its offset
fn push_object(pdf: &mut Vec<u8>, id: u32, dict: &str, stream: Option<&[u8]>) -> u32 {
    let offset = pdf.len() as u32;
    pdf.extend_from_slice(format!("{} 0 obj\n{}\n", id, dict).as_bytes());
    if let Some(data) = stream {
        pdf.extend_from_slice(b"stream\n");
        pdf.extend_from_slice(data);
        pdf.extend_from_slice(b"\nendstream\n");
    }
    pdf.extend_from_slice(b"endobj\n");
    offset
}

/// Whether `needle` occurs anywhere in `haystack`
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Page object ids in page order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}
