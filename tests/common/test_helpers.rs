use std::path::PathBuf;
use tempfile::TempDir;

pub const NEWSML_NS: &str = "http://iptc.org/std/nar/2006-10-01/";

/// Wrapper with one empty `newsItem` per guid
pub fn wrapper_with_items(guids: &[&str]) -> String {
    let items: Vec<(&str, &str)> = guids.iter().map(|guid| (*guid, "")).collect();
    wrapper_with_content(&items)
}

/// Wrapper whose items carry `content` inside `contentSet/inlineXML`
pub fn wrapper_with_content(items: &[(&str, &str)]) -> String {
    let mut xml = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<newsMessage xmlns=\"{NEWSML_NS}\">\n  <itemSet>\n");
    for (guid, content) in items {
        if content.is_empty() {
            xml.push_str(&format!("    <newsItem guid=\"{guid}\"/>\n"));
        } else {
            xml.push_str(&format!(
                "    <newsItem guid=\"{guid}\"><contentSet><inlineXML>{content}</inlineXML></contentSet></newsItem>\n"
            ));
        }
    }
    xml.push_str("  </itemSet>\n</newsMessage>\n");
    xml
}

pub const EMPTY_WRAPPER: &str =
    r#"<newsMessage xmlns="http://iptc.org/std/nar/2006-10-01/"><itemSet/></newsMessage>"#;

pub const MALFORMED: &str =
    r#"<newsMessage xmlns="http://iptc.org/std/nar/2006-10-01/"><itemSet><newsItem guid="A1"></itemSet>"#;

/// XHTML with one schema.org item
pub const XHTML_WITH_MICRODATA: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Launch</title></head><body><div itemscope="" itemtype="http://schema.org/NewsArticle"><h1 itemprop="headline">Launch day</h1><time itemprop="datePublished" datetime="2024-05-01T09:00:00Z">1 May</time></div></body></html>"#;

/// XHTML with a relative itemtype
pub const XHTML_WITH_BAD_MICRODATA: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>x</title></head><body><div itemscope="" itemtype="NewsArticle"><h1 itemprop="headline">x</h1></div></body></html>"#;

pub const NITF_BODY: &str =
    r#"<nitf xmlns="http://iptc.org/std/NITF/2006-10-18/"><body>Story text</body></nitf>"#;

const NEWSML_XSD: &str = r###"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="http://iptc.org/std/nar/2006-10-01/"
           xmlns="http://iptc.org/std/nar/2006-10-01/"
           elementFormDefault="qualified">
  <xs:element name="newsMessage">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="itemSet">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="newsItem" minOccurs="0" maxOccurs="unbounded">
                <xs:complexType>
                  <xs:sequence>
                    <xs:any namespace="##any" processContents="skip" minOccurs="0" maxOccurs="unbounded"/>
                  </xs:sequence>
                  <xs:attribute name="guid" type="xs:string" use="required"/>
                </xs:complexType>
              </xs:element>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"###;

const NITF_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="http://iptc.org/std/NITF/2006-10-18/"
           xmlns="http://iptc.org/std/NITF/2006-10-18/"
           elementFormDefault="qualified">
  <xs:element name="nitf">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="body" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

/// Schema fixtures written to a temporary directory
pub struct SchemaFixtures {
    pub dir: TempDir,
}

impl SchemaFixtures {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("newsml.xsd"), NEWSML_XSD).expect("write newsml.xsd");
        std::fs::write(dir.path().join("nitf.xsd"), NITF_XSD).expect("write nitf.xsd");
        Self { dir }
    }

    pub fn newsml(&self) -> PathBuf {
        self.dir.path().join("newsml.xsd")
    }

    pub fn nitf(&self) -> PathBuf {
        self.dir.path().join("nitf.xsd")
    }

    pub fn newsml_location(&self) -> String {
        self.newsml().to_string_lossy().to_string()
    }

    pub fn nitf_location(&self) -> String {
        self.nitf().to_string_lossy().to_string()
    }

    /// Write `content` next to the schemas and return its path
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }
}

/// Endpoint nothing listens on
pub const UNREACHABLE_CHECKER: &str = "http://127.0.0.1:9/";
