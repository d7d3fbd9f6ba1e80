//! Parsers for the CI server's XML metadata documents.
//!
//! Three documents are read: the project listing (build types), the build
//! listing of one build type, and a single build's detail. The schema is the
//! server's versioned REST contract; anything that does not match it is
//! reported as malformed rather than guessed around.

use crate::error::{ConfigurationError, OperationError};
use roxmltree::{Document, Node};

/// A named CI pipeline definition.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct BuildConfiguration {
    /// Configuration id used in REST paths, e.g. `XRootD_Release`
    pub id: String,
    /// Human name shown in the CI UI
    pub name: String,
}

/// Reference to one build in a build listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildRef {
    /// Build id used in the artifact URL
    pub id: String,
    /// Server-relative link to the build detail document
    pub href: String,
}

/// Parse `/project/buildTypes/buildType` entries of a project document.
pub fn parse_project_listing(
    xml: &str,
    url: &str,
) -> Result<Vec<BuildConfiguration>, ConfigurationError> {
    let malformed = |reason: String| ConfigurationError::MalformedProjectListing {
        url: url.to_string(),
        reason,
    };

    let doc = Document::parse(xml).map_err(|e| malformed(e.to_string()))?;
    let project = doc.root_element();
    if !project.has_tag_name("project") {
        return Err(malformed(format!(
            "expected <project> root, found <{}>",
            project.tag_name().name()
        )));
    }

    let mut configurations = Vec::new();
    for build_types in children(project, "buildTypes") {
        for build_type in children(build_types, "buildType") {
            let id = build_type
                .attribute("id")
                .ok_or_else(|| malformed("buildType without id".to_string()))?;
            let name = build_type
                .attribute("name")
                .ok_or_else(|| malformed(format!("buildType {id} without name")))?;
            configurations.push(BuildConfiguration {
                id: id.to_string(),
                name: name.to_string(),
            });
        }
    }

    Ok(configurations)
}

/// Parse every `build` element of a build listing.
pub fn parse_build_listing(xml: &str, url: &str) -> Result<Vec<BuildRef>, OperationError> {
    let doc = parse_document(xml, url)?;

    doc.descendants()
        .filter(|n| n.has_tag_name("build"))
        .map(|build| {
            let attr = |name: &str| {
                build
                    .attribute(name)
                    .map(str::to_string)
                    .ok_or_else(|| OperationError::MalformedDocument {
                        url: url.to_string(),
                        reason: format!("build element without {name} attribute"),
                    })
            };
            Ok(BuildRef {
                id: attr("id")?,
                href: attr("href")?,
            })
        })
        .collect()
}

/// Extract the first tag of a build detail document, if any.
///
/// The tag is the text of the first `tag` element with surrounding whitespace
/// stripped; newer servers put it in a `name` attribute instead, which is used
/// when the element has no text. Requested tags are stripped the same way by
/// [`UnpackRequest::new`](crate::settings::UnpackRequest::new).
pub fn parse_build_tag(xml: &str, url: &str) -> Result<Option<String>, OperationError> {
    let doc = parse_document(xml, url)?;

    let tag = doc
        .descendants()
        .find(|n| n.has_tag_name("tag"))
        .and_then(|tag| {
            tag.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .or_else(|| tag.attribute("name"))
                .map(str::to_string)
        });

    Ok(tag)
}

fn parse_document<'a>(xml: &'a str, url: &str) -> Result<Document<'a>, OperationError> {
    Document::parse(xml).map_err(|e| OperationError::MalformedDocument {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.has_tag_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<project id="XRootD" name="XRootD" href="/guestAuth/app/rest/projects/id:XRootD">
  <buildTypes count="2">
    <buildType id="bt42" name="Release" projectId="XRootD"/>
    <buildType id="bt43" name="Nightly" projectId="XRootD"/>
  </buildTypes>
  <templates count="1">
    <buildType id="tpl1" name="Template"/>
  </templates>
</project>"#;

    #[test]
    fn project_listing_reads_direct_build_types_only() {
        let configs = parse_project_listing(PROJECT, "u").unwrap();
        assert_eq!(
            configs,
            vec![
                BuildConfiguration { id: "bt42".into(), name: "Release".into() },
                BuildConfiguration { id: "bt43".into(), name: "Nightly".into() },
            ]
        );
    }

    #[test]
    fn project_listing_rejects_wrong_document() {
        let err = parse_project_listing("<builds/>", "u").unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedProjectListing { .. }));
        let err = parse_project_listing("<html><body>login</body>", "u").unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedProjectListing { .. }));
    }

    #[test]
    fn build_listing_in_document_order() {
        let xml = r#"<builds count="2">
            <build id="1235" number="12" href="/guestAuth/app/rest/builds/id:1235"/>
            <build id="1234" number="11" href="/guestAuth/app/rest/builds/id:1234"/>
        </builds>"#;
        let builds = parse_build_listing(xml, "u").unwrap();
        assert_eq!(builds.len(), 2);
        assert_eq!(builds[0].id, "1235");
        assert_eq!(builds[1].href, "/guestAuth/app/rest/builds/id:1234");
    }

    #[test]
    fn build_listing_requires_href() {
        let err = parse_build_listing(r#"<builds><build id="1"/></builds>"#, "u").unwrap_err();
        assert!(matches!(err, OperationError::MalformedDocument { .. }));
    }

    #[test]
    fn build_tag_first_text_or_name() {
        let text = r#"<build id="1"><tags><tag>v4.2.0</tag><tag>other</tag></tags></build>"#;
        assert_eq!(parse_build_tag(text, "u").unwrap().as_deref(), Some("v4.2.0"));

        let attr = r#"<build id="1"><tags count="1"><tag name="v4.3.0"/></tags></build>"#;
        assert_eq!(parse_build_tag(attr, "u").unwrap().as_deref(), Some("v4.3.0"));

        let padded = "<build id=\"1\"><tags><tag>\n  v4.2.0\n</tag></tags></build>";
        assert_eq!(parse_build_tag(padded, "u").unwrap().as_deref(), Some("v4.2.0"));

        let none = r#"<build id="1"><tags count="0"/></build>"#;
        assert_eq!(parse_build_tag(none, "u").unwrap(), None);
    }
}
