//! Test fixtures for integration tests
//!
//! Every fixture is built on the fly into a temporary directory: OOXML
//! packages with `zip`, legacy binaries with `cfb`, PDFs with `lopdf` and
//! images with `image`.

#![allow(dead_code)]

use std::{
    fs::{self, File},
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use tempfile::TempDir;
use zip::{write::FileOptions, ZipWriter};

// Main-part content types
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
pub const XLSM: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";
pub const XLSB: &str = "application/vnd.ms-excel.sheet.binary.macroEnabled.main";
pub const XLTX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml";
pub const XLTM: &str = "application/vnd.ms-excel.template.macroEnabled.main+xml";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const DOCM: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
pub const DOTX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
pub const DOTM: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";
pub const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const PPTM: &str = "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
pub const PPSX: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";
pub const PPSM: &str = "application/vnd.ms-powerpoint.slideshow.macroEnabled.main+xml";
pub const POTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
pub const POTM: &str = "application/vnd.ms-powerpoint.template.macroEnabled.main+xml";

// Part content types
pub const WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
pub const BINARY_WORKSHEET: &str = "application/vnd.ms-excel.worksheet";
pub const MACROSHEET: &str = "application/vnd.ms-excel.macrosheet+xml";
pub const HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
pub const GLOSSARY: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.glossary+xml";
pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const VBA_PROJECT: &str = "application/vnd.ms-office.vbaProject";

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const REL_OLE_OBJECT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/oleObject";
pub const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

pub const SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="n"><v>42</v></c></row></sheetData></worksheet>"#;

pub const SHEET_WITH_OLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetData/><oleObjects><oleObject progId="Package" shapeId="1025" r:id="rId1"/></oleObjects></worksheet>"#;

pub const SLIDE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Quarterly results</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

pub const SLIDE_WITH_OLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:cSld><p:spTree><p:graphicFrame><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/presentationml/2006/ole"><p:oleObj progId="Package" r:id="rId2"/></a:graphicData></a:graphic></p:graphicFrame></p:spTree></p:cSld></p:sld>"#;

pub const DOCUMENT_BODY: &str = r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p><w:p><w:r><w:drawing><wp:inline/></w:drawing></w:r></w:p>"#;

pub const DOCUMENT_BODY_WITH_OLE: &str = r#"<w:p><w:r><w:object><v:shape id="_x0000_i1025"/><o:OLEObject Type="Embed" ProgID="Package" ShapeID="_x0000_i1025" r:id="rId5"/></w:object></w:r></w:p>"#;

pub const PHP_PAYLOAD: &str = "<?php phpinfo(); ?>";

/// Builds an OOXML package part by part
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    parts: Vec<(String, Option<String>, Vec<u8>)>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a part; `content_type` becomes an `Override`
    pub fn part(mut self, name: &str, content_type: Option<&str>, body: impl AsRef<[u8]>) -> Self {
        self.parts.retain(|(existing, _, _)| existing != name);
        self.parts
            .push((name.to_string(), content_type.map(str::to_string), body.as_ref().to_vec()));
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.parts.retain(|(existing, _, _)| existing != name);
        self
    }

    /// Adds the relationships part of `owner`
    pub fn relationships(self, owner: &str, entries: &[(&str, &str, &str)]) -> Self {
        let (dir, file) = owner.rsplit_once('/').unwrap_or(("", owner));
        let rels_name = if dir.is_empty() {
            format!("_rels/{}.rels", file)
        } else {
            format!("{}/_rels/{}.rels", dir, file)
        };
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (id, rel_type, target) in entries {
            xml.push_str(&format!(r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#, id, rel_type, target));
        }
        xml.push_str("</Relationships>");
        self.part(&rels_name, None, xml)
    }

    pub fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>"#,
        );
        for (name, content_type, _) in &self.parts {
            if let Some(content_type) = content_type {
                xml.push_str(&format!(r#"<Override PartName="/{}" ContentType="{}"/>"#, name, content_type));
            }
        }
        xml.push_str("</Types>");
        xml
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        writer.start_file("[Content_Types].xml", FileOptions::default()).unwrap();
        writer.write_all(self.content_types().as_bytes()).unwrap();
        for (name, _, body) in &self.parts {
            writer.start_file(name.as_str(), FileOptions::default()).unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap();
        path.to_path_buf()
    }
}

pub struct TestFixtures;

impl TestFixtures {
    pub fn workspace() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    pub fn write(path: &Path, bytes: impl AsRef<[u8]>) -> PathBuf {
        fs::write(path, bytes).unwrap();
        path.to_path_buf()
    }

    // ---------------------------------------------------------------
    // Office Open XML
    // ---------------------------------------------------------------

    /// One-sheet workbook whose workbook part declares `main_type`
    pub fn workbook(main_type: &str) -> PackageBuilder {
        let binary = main_type == XLSB;
        let (workbook, sheet, sheet_type, sheet_body): (&str, &str, &str, &[u8]) = if binary {
            ("xl/workbook.bin", "xl/worksheets/sheet1.bin", BINARY_WORKSHEET, &[0x81, 0x01, 0x00, 0x82, 0x01, 0x00])
        } else {
            ("xl/workbook.xml", "xl/worksheets/sheet1.xml", WORKSHEET, SHEET_XML.as_bytes())
        };
        let workbook_body: &[u8] = if binary {
            &[0x83, 0x01, 0x00, 0x84, 0x01, 0x00]
        } else {
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets><sheet name="Sheet1" sheetId="1"/></sheets></workbook>"#
        };
        PackageBuilder::new()
            .relationships("", &[("rId1", REL_OFFICE_DOCUMENT, workbook)])
            .part(workbook, Some(main_type), workbook_body)
            .part(sheet, Some(sheet_type), sheet_body)
    }

    /// Word package whose main part wraps `body` in `w:document/w:body`
    pub fn word_document(main_type: &str, body: &str) -> PackageBuilder {
        PackageBuilder::new()
            .relationships("", &[("rId1", REL_OFFICE_DOCUMENT, "word/document.xml")])
            .part("word/document.xml", Some(main_type), Self::word_part("document", body))
    }

    pub fn word_part(root: &str, body: &str) -> String {
        let inner = if root == "document" {
            format!("<w:body>{}</w:body>", body)
        } else {
            body.to_string()
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:{root} xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:r="{ns}">{inner}</w:{root}>"#,
            root = root,
            ns = REL_NS,
            inner = inner
        )
    }

    /// One-slide presentation whose presentation part declares `main_type`
    pub fn presentation(main_type: &str) -> PackageBuilder {
        PackageBuilder::new()
            .relationships("", &[("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml")])
            .part(
                "ppt/presentation.xml",
                Some(main_type),
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst><p:sldId id="256"/></p:sldIdLst></p:presentation>"#,
            )
            .part("ppt/slides/slide1.xml", Some(SLIDE), SLIDE_XML)
    }

    /// A stand-in VBA project; only its presence matters
    pub fn vba_project(builder: PackageBuilder, dir: &str) -> PackageBuilder {
        builder.part(&format!("{}/vbaProject.bin", dir), Some(VBA_PROJECT), b"Attribute VB_Name = \"Module1\"")
    }

    // ---------------------------------------------------------------
    // Compound files
    // ---------------------------------------------------------------

    /// Writes a compound file. Storages are created first, in order.
    pub fn compound(path: &Path, storages: &[&str], streams: &[(&str, Vec<u8>)]) -> PathBuf {
        let mut file = cfb::create(path).unwrap();
        for storage in storages {
            file.create_storage(storage).unwrap();
        }
        for (name, data) in streams {
            let mut stream = file.create_stream(name).unwrap();
            stream.write_all(data).unwrap();
        }
        file.flush().unwrap();
        path.to_path_buf()
    }

    pub fn biff_record(kind: u16, data: &[u8]) -> Vec<u8> {
        let mut out = kind.to_le_bytes().to_vec();
        out.extend_from_slice(&(data.len() as u16).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    /// BoundSheet8 record; `dt` 1 marks an XLM macro sheet
    pub fn biff_boundsheet(name: &str, dt: u8) -> Vec<u8> {
        let mut data = vec![0, 0, 0, 0, 0, dt, name.len() as u8, 0];
        data.extend_from_slice(name.as_bytes());
        Self::biff_record(0x0085, &data)
    }

    /// Obj record with an ftCmo of type `ot` and optional trailing sub-records
    pub fn biff_obj(ot: u16, extra: &[u8]) -> Vec<u8> {
        let mut data = 0x0015u16.to_le_bytes().to_vec();
        data.extend_from_slice(&18u16.to_le_bytes());
        data.extend_from_slice(&ot.to_le_bytes());
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(extra);
        data.extend_from_slice(&[0, 0, 0, 0]);
        Self::biff_record(0x005D, &data)
    }

    /// Picture Obj carrying an ftPictFmla, i.e. an embedded OLE object
    pub fn biff_ole_obj() -> Vec<u8> {
        Self::biff_obj(0x0008, &[0x09, 0x00, 0x04, 0x00, 0x05, 0x00, 0x00, 0x00])
    }

    /// Workbook stream with one substream per `(name, dt, records)`
    pub fn biff_workbook(sheets: &[(&str, u8, Vec<u8>)]) -> Vec<u8> {
        let bof = Self::biff_record(0x0809, &[0x00, 0x06, 0x05, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let eof = Self::biff_record(0x000A, &[]);
        let mut stream = bof.clone();
        for (name, dt, _) in sheets {
            stream.extend(Self::biff_boundsheet(name, *dt));
        }
        stream.extend(&eof);
        for (_, _, records) in sheets {
            stream.extend(&bof);
            stream.extend(records);
            stream.extend(&eof);
        }
        stream
    }

    pub fn xls(path: &Path, workbook: Vec<u8>, storages: &[&str]) -> PathBuf {
        Self::compound(path, storages, &[("/Workbook", workbook)])
    }

    pub fn clean_xls(path: &Path) -> PathBuf {
        let sheet = [Self::biff_record(0x0203, &[0; 14]), Self::biff_obj(0x0005, &[])].concat();
        Self::xls(path, Self::biff_workbook(&[("Data", 0, sheet)]), &[])
    }

    /// Start of a WordDocument stream with the given FIB flags
    pub fn word_fib(flags: u16) -> Vec<u8> {
        let mut fib = vec![0u8; 1472];
        fib[0..2].copy_from_slice(&0xA5ECu16.to_le_bytes());
        fib[2..4].copy_from_slice(&0x00C1u16.to_le_bytes());
        fib[0x0A..0x0C].copy_from_slice(&flags.to_le_bytes());
        fib
    }

    pub fn doc(path: &Path, flags: u16, storages: &[&str]) -> PathBuf {
        Self::compound(
            path,
            storages,
            &[("/WordDocument", Self::word_fib(flags)), ("/1Table", vec![0u8; 512])],
        )
    }

    pub fn ppt_atom(kind: u16, body: &[u8]) -> Vec<u8> {
        let mut out = 0u16.to_le_bytes().to_vec();
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    pub fn ppt_container(kind: u16, children: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = children.concat();
        let mut out = 0x000Fu16.to_le_bytes().to_vec();
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    /// Slide container whose drawing holds one shape per entry of `shape_flags`
    pub fn ppt_slide(shape_flags: &[u32]) -> Vec<u8> {
        let shapes: Vec<Vec<u8>> = shape_flags
            .iter()
            .enumerate()
            .map(|(i, flags)| {
                let mut body = (1024 + i as u32).to_le_bytes().to_vec();
                body.extend_from_slice(&flags.to_le_bytes());
                Self::ppt_container(0xF004, &[Self::ppt_atom(0xF00A, &body)])
            })
            .collect();
        let drawing = Self::ppt_container(0xF002, &[Self::ppt_container(0xF003, &shapes)]);
        Self::ppt_container(
            0x03EE,
            &[Self::ppt_atom(0x03EF, &[0; 24]), Self::ppt_container(0x040C, &[drawing])],
        )
    }

    /// PowerPoint Document stream; `with_vba` nests a VbaInfo container
    pub fn ppt_stream(slides: &[Vec<u8>], with_vba: bool) -> Vec<u8> {
        let mut document_children = vec![Self::ppt_atom(0x03E9, &[0; 40])];
        if with_vba {
            document_children.push(Self::ppt_container(
                0x07D0,
                &[Self::ppt_container(0x03FF, &[Self::ppt_atom(0x0400, &[0; 12])])],
            ));
        }
        let mut stream = Self::ppt_container(0x03E8, &document_children);
        for slide in slides {
            stream.extend(slide);
        }
        stream
    }

    pub fn ppt(path: &Path, stream: Vec<u8>, extra_streams: &[&str]) -> PathBuf {
        let mut streams = vec![("/PowerPoint Document", stream), ("/Current User", vec![0u8; 64])];
        for name in extra_streams {
            streams.push((*name, vec![0u8; 32]));
        }
        Self::compound(path, &[], &streams)
    }

    // ---------------------------------------------------------------
    // Flat text formats
    // ---------------------------------------------------------------

    pub fn wordml(path: &Path, body: &str) -> PathBuf {
        Self::write(
            path,
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<?mso-application progid="Word.Document"?>
<w:wordDocument xmlns:w="http://schemas.microsoft.com/office/word/2003/wordml" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office"><w:body>{}</w:body></w:wordDocument>"#,
                body
            ),
        )
    }

    pub fn mhtml(path: &Path) -> PathBuf {
        Self::write(
            path,
            "MIME-Version: 1.0\r\nContent-Type: multipart/related; boundary=\"----=_NextPart\"\r\n\r\n\
             ------=_NextPart\r\nContent-Type: text/html; charset=\"utf-8\"\r\n\r\n<html><body><p>Hello</p></body></html>\r\n\
             ------=_NextPart--\r\n",
        )
    }

    // ---------------------------------------------------------------
    // PDF
    // ---------------------------------------------------------------

    /// One-page PDF; `configure` may add entries to the catalog
    pub fn pdf(path: &Path, configure: impl FnOnce(&mut Document, &mut Dictionary)) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"BT /F1 12 Tf 72 720 Td (Hello) Tj ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        configure(&mut doc, &mut catalog);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
        path.to_path_buf()
    }

    pub fn clean_pdf(path: &Path) -> PathBuf {
        Self::pdf(path, |_, _| {})
    }

    fn javascript_action(script: &str) -> Dictionary {
        dictionary! {
            "S" => "JavaScript",
            "JS" => Object::string_literal(script),
        }
    }

    /// Script registered in the catalog's `/Names /JavaScript` tree
    pub fn pdf_with_javascript(path: &Path, script: &str) -> PathBuf {
        let script = script.to_string();
        Self::pdf(path, move |doc, catalog| {
            let action = doc.add_object(Self::javascript_action(&script));
            let tree = dictionary! {
                "Names" => vec![Object::string_literal("init"), Object::Reference(action)],
            };
            catalog.set("Names", dictionary! { "JavaScript" => tree });
        })
    }

    /// Script run through the catalog's `/OpenAction`
    pub fn pdf_with_open_action(path: &Path, script: &str) -> PathBuf {
        let script = script.to_string();
        Self::pdf(path, move |doc, catalog| {
            let action = doc.add_object(Self::javascript_action(&script));
            catalog.set("OpenAction", action);
        })
    }

    fn attachment(doc: &mut Document, name: &str) -> Object {
        let data = doc.add_object(Stream::new(
            dictionary! { "Type" => "EmbeddedFile" },
            b"MZ\x90\x00 not really an executable".to_vec(),
        ));
        let filespec = doc.add_object(dictionary! {
            "Type" => "Filespec",
            "F" => Object::string_literal(name),
            "EF" => dictionary! { "F" => data },
        });
        Object::Reference(filespec)
    }

    pub fn pdf_with_attachment(path: &Path) -> PathBuf {
        Self::pdf(path, |doc, catalog| {
            let filespec = Self::attachment(doc, "invoice.exe");
            let tree = dictionary! {
                "Names" => vec![Object::string_literal("invoice.exe"), filespec],
            };
            catalog.set("Names", dictionary! { "EmbeddedFiles" => tree });
        })
    }

    /// Attachment reachable only through a `/Kids` node of the name tree
    pub fn pdf_with_attachment_in_kids(path: &Path) -> PathBuf {
        Self::pdf(path, |doc, catalog| {
            let filespec = Self::attachment(doc, "payload.bin");
            let leaf = doc.add_object(dictionary! {
                "Names" => vec![Object::string_literal("payload.bin"), filespec],
                "Limits" => vec![Object::string_literal("payload.bin"), Object::string_literal("payload.bin")],
            });
            let tree = dictionary! { "Kids" => vec![Object::Reference(leaf)] };
            catalog.set("Names", dictionary! { "EmbeddedFiles" => tree });
        })
    }

    /// `/Names` dictionary present but both trees empty
    pub fn pdf_with_empty_names(path: &Path) -> PathBuf {
        Self::pdf(path, |_, catalog| {
            catalog.set(
                "Names",
                dictionary! {
                    "JavaScript" => dictionary! { "Names" => Vec::<Object>::new() },
                    "EmbeddedFiles" => dictionary! { "Names" => Vec::<Object>::new() },
                },
            );
        })
    }

    // ---------------------------------------------------------------
    // Images
    // ---------------------------------------------------------------

    pub fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 13 % 256) as u8, (y * 17 % 256) as u8, ((x + y) * 7 % 256) as u8])
        }))
    }

    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    pub fn image(path: &Path, width: u32, height: u32, format: ImageFormat) -> PathBuf {
        let image = Self::gradient(width, height);
        let image = if format == ImageFormat::Gif {
            DynamicImage::ImageRgba8(image.to_rgba8())
        } else {
            image
        };
        Self::write(path, Self::encode(&image, format))
    }

    /// Little-endian TIFF IFD with a single ImageDescription entry
    fn exif_tiff(text: &str) -> Vec<u8> {
        let mut tiff = b"II*\x00".to_vec();
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x010Eu16.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&(text.len() as u32 + 1).to_le_bytes());
        tiff.extend_from_slice(&26u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(text.as_bytes());
        tiff.push(0);
        tiff
    }

    /// JPEG carrying `text` in an Exif APP1 segment right after SOI
    pub fn jpeg_with_exif_text(path: &Path, width: u32, height: u32, text: &str) -> PathBuf {
        let jpeg = Self::encode(&Self::gradient(width, height), ImageFormat::Jpeg);
        let mut payload = b"Exif\x00\x00".to_vec();
        payload.extend(Self::exif_tiff(text));
        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
        segment.extend(payload);

        let mut out = jpeg[..2].to_vec();
        out.extend(segment);
        out.extend_from_slice(&jpeg[2..]);
        Self::write(path, out)
    }

    /// Uncompressed RGB TIFF whose ImageDescription tag holds `text`
    pub fn tiff_with_description(path: &Path, width: u16, height: u16, text: &str) -> PathBuf {
        const ENTRIES: u16 = 11;
        let ifd_len = 2 + ENTRIES as u32 * 12 + 4;
        let bits_offset = 8 + ifd_len;
        let text_offset = bits_offset + 6;
        let pixels_offset = text_offset + text.len() as u32 + 1;
        let pixel_bytes = width as u32 * height as u32 * 3;

        let mut out = b"II*\x00".to_vec();
        out.extend_from_slice(&8u32.to_le_bytes());
        out.extend_from_slice(&ENTRIES.to_le_bytes());
        let mut entry = |tag: u16, kind: u16, count: u32, value: u32| {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&kind.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&value.to_le_bytes());
        };
        const SHORT: u16 = 3;
        const LONG: u16 = 4;
        const ASCII: u16 = 2;
        entry(256, SHORT, 1, width as u32);
        entry(257, SHORT, 1, height as u32);
        entry(258, SHORT, 3, bits_offset);
        entry(259, SHORT, 1, 1);
        entry(262, SHORT, 1, 2);
        entry(270, ASCII, text.len() as u32 + 1, text_offset);
        entry(273, LONG, 1, pixels_offset);
        entry(277, SHORT, 1, 3);
        entry(278, SHORT, 1, height as u32);
        entry(279, LONG, 1, pixel_bytes);
        entry(284, SHORT, 1, 1);
        out.extend_from_slice(&0u32.to_le_bytes());

        for _ in 0..3 {
            out.extend_from_slice(&8u16.to_le_bytes());
        }
        out.extend_from_slice(text.as_bytes());
        out.push(0);
        for y in 0..height as u32 {
            for x in 0..width as u32 {
                out.extend_from_slice(&[(x * 40 % 256) as u8, (y * 60 % 256) as u8, 90]);
            }
        }
        Self::write(path, out)
    }

    /// GIF with `text` appended after its trailer byte
    pub fn gif_with_trailer(path: &Path, width: u32, height: u32, text: &str) -> PathBuf {
        let image = DynamicImage::ImageRgba8(Self::gradient(width, height).to_rgba8());
        let mut bytes = Self::encode(&image, ImageFormat::Gif);
        bytes.extend_from_slice(text.as_bytes());
        Self::write(path, bytes)
    }

    /// DOS executable header, whatever the file name claims
    pub fn executable(path: &Path) -> PathBuf {
        let mut bytes = b"MZ\x90\x00\x03\x00\x00\x00\x04\x00\x00\x00\xFF\xFF\x00\x00".to_vec();
        bytes.extend_from_slice(&[0u8; 48]);
        bytes.extend_from_slice(b"This program cannot be run in DOS mode.\r\r\n$");
        Self::write(path, bytes)
    }

    /// True when `needle` occurs anywhere in `haystack`
    pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }
}
