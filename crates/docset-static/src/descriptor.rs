//! `Info.plist` descriptor that identifies the docset to browser tools.

use std::path::Path;

use minijinja::{context, AutoEscape, Environment};
use tokio::fs;

use crate::builder::BuildError;

const PLIST_TEMPLATE_NAME: &str = "Info.plist";

const PLIST_TEMPLATE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>CFBundleIdentifier</key>
  <string>{{ name }}</string>
  <key>CFBundleName</key>
  <string>{{ name }}</string>
  <key>DocSetPlatformFamily</key>
  <string>{{ name }}</string>
  <key>isDashDocset</key>
  <true/>
</dict>
</plist>
"##;

/// Render the descriptor for a docset called `name`.
pub fn render_info_plist(name: &str) -> Result<String, BuildError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_template(PLIST_TEMPLATE_NAME, PLIST_TEMPLATE)
        .map_err(|e| BuildError::TemplateError(e.to_string()))?;

    env.get_template(PLIST_TEMPLATE_NAME)
        .and_then(|tmpl| tmpl.render(context! { name => name }))
        .map_err(|e| BuildError::TemplateError(e.to_string()))
}

/// Write the descriptor to `path`.
pub async fn write_info_plist(path: &Path, name: &str) -> Result<(), BuildError> {
    let plist = render_info_plist(name)?;

    fs::write(path, plist)
        .await
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    use quick_xml::events::Event;
    use quick_xml::Reader;

    /// Parse a flat plist `<dict>` into key/value pairs.
    ///
    /// String values are returned unescaped; `<true/>` and `<false/>` become
    /// `"true"` and `"false"`.
    pub(crate) fn parse_plist(xml: &str) -> HashMap<String, String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut values = HashMap::new();
        let mut current_key: Option<String> = None;
        let mut in_key = false;
        let mut in_string = false;

        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => match e.name().as_ref() {
                    b"key" => in_key = true,
                    b"string" => in_string = true,
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"key" => in_key = false,
                    b"string" => in_string = false,
                    _ => {}
                },
                Event::Empty(e) => {
                    let value = match e.name().as_ref() {
                        b"true" => "true",
                        b"false" => "false",
                        _ => continue,
                    };
                    if let Some(key) = current_key.take() {
                        values.insert(key, value.to_string());
                    }
                }
                Event::Text(t) => {
                    let text = t.unescape().unwrap().into_owned();
                    if in_key {
                        current_key = Some(text);
                    } else if in_string {
                        if let Some(key) = current_key.take() {
                            values.insert(key, text);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        values
    }

    #[test]
    fn renders_all_identity_fields() {
        let plist = render_info_plist("tldr").unwrap();
        let values = parse_plist(&plist);

        assert_eq!(values["CFBundleIdentifier"], "tldr");
        assert_eq!(values["CFBundleName"], "tldr");
        assert_eq!(values["DocSetPlatformFamily"], "tldr");
        assert_eq!(values["isDashDocset"], "true");
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn escapes_name() {
        let plist = render_info_plist("a&b<c>").unwrap();
        let values = parse_plist(&plist);

        assert_eq!(values["CFBundleName"], "a&b<c>");
    }

    #[tokio::test]
    async fn writes_descriptor_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("Info.plist");

        write_info_plist(&path, "tldr").await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml"));
        assert_eq!(parse_plist(&written)["isDashDocset"], "true");
    }
}
