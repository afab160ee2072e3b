use std::{fs, path::Path};

use crate::device::ShaderStage;

const SHADER_MARKER: &str = "#shader";

/// How `#shader <stage>` marker lines are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerMatching {
    /// The trimmed line must start with the `#shader` token, followed by
    /// `vertex` or `fragment` as the second token.
    #[default]
    ExactToken,
    /// Any line containing `#shader` is a marker, switching on whether it
    /// contains `vertex` or `fragment` anywhere. A comment mentioning
    /// `#shader` switches sections too.
    Substring,
}

/// Vertex and fragment stage sources split out of a single text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, MarkerMatching::ExactToken)
    }

    /// Lines before the first marker belong to the vertex stage, repeated
    /// markers of the same stage keep appending to it.
    pub fn parse_with(text: &str, matching: MarkerMatching) -> Self {
        let mut sources = Self::default();
        let mut mode = ShaderStage::Vertex;

        for line in text.lines() {
            match parse_marker(line, matching) {
                Some(Marker::Switch(stage)) => {
                    mode = stage;
                    continue;
                }
                Some(Marker::Unknown) => {
                    log::warn!("Unknown shader stage marker, line = {line:?}");
                    continue;
                }
                None => (),
            }

            let section = match mode {
                ShaderStage::Vertex => &mut sources.vertex,
                ShaderStage::Fragment => &mut sources.fragment,
            };
            section.push_str(line);
            section.push('\n');
        }

        sources
    }

    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        fs::read_to_string(path).map(|text| Self::parse(&text))
    }

    pub fn source_of(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

enum Marker {
    Switch(ShaderStage),
    Unknown,
}

fn parse_marker(line: &str, matching: MarkerMatching) -> Option<Marker> {
    match matching {
        MarkerMatching::ExactToken => {
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some(SHADER_MARKER) {
                return None;
            }

            Some(match tokens.next() {
                Some("vertex") => Marker::Switch(ShaderStage::Vertex),
                Some("fragment") => Marker::Switch(ShaderStage::Fragment),
                _ => Marker::Unknown,
            })
        }
        MarkerMatching::Substring => {
            if !line.contains(SHADER_MARKER) {
                return None;
            }

            Some(if line.contains("vertex") {
                Marker::Switch(ShaderStage::Vertex)
            } else if line.contains("fragment") {
                Marker::Switch(ShaderStage::Fragment)
            } else {
                Marker::Unknown
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const DEFAULT_SHADER: &str = "#shader vertex
#version 330 core
layout(location = 0) in vec4 position;
void main() { gl_Position = position; }
#shader fragment
layout(location = 0) out vec4 color;
void main() { color = vec4(1.0); }
";

    #[test]
    fn splits_the_text_at_the_markers() {
        let sources = ShaderSources::parse(DEFAULT_SHADER);

        assert_eq!(
            "#version 330 core\n\
             layout(location = 0) in vec4 position;\n\
             void main() { gl_Position = position; }\n",
            sources.vertex
        );
        assert_eq!(
            "layout(location = 0) out vec4 color;\n\
             void main() { color = vec4(1.0); }\n",
            sources.fragment
        );
    }

    #[test]
    fn sections_may_come_in_any_order_and_repeat() {
        let text = "#shader fragment\nf1\n#shader vertex\nv1\n#shader fragment\nf2\n";

        let sources = ShaderSources::parse(text);

        assert_eq!("v1\n", sources.vertex);
        assert_eq!("f1\nf2\n", sources.fragment);
        assert_eq!("f1\nf2\n", sources.source_of(ShaderStage::Fragment));
    }

    #[test]
    fn lines_before_any_marker_belong_to_the_vertex_stage() {
        let sources = ShaderSources::parse("v0\n#shader fragment\nf0");

        assert_eq!("v0\n", sources.vertex);
        assert_eq!("f0\n", sources.fragment);
    }

    #[test]
    fn markers_are_matched_on_the_trimmed_line() {
        let sources = ShaderSources::parse("  #shader   fragment  \r\nf0\r\n");

        assert_eq!("", sources.vertex);
        assert_eq!("f0\n", sources.fragment);
    }

    #[test]
    fn exact_matching_ignores_markers_mentioned_in_comments() {
        let text = "#shader vertex\n// see #shader fragment below\nv1\n#shader fragment\nf1\n";

        let sources = ShaderSources::parse(text);

        assert_eq!("// see #shader fragment below\nv1\n", sources.vertex);
        assert_eq!("f1\n", sources.fragment);
    }

    #[test]
    fn substring_matching_switches_on_markers_in_comments() {
        let text = "#shader vertex\n// see #shader fragment below\nv1\n#shader fragment\nf1\n";

        let sources = ShaderSources::parse_with(text, MarkerMatching::Substring);

        assert_eq!("", sources.vertex);
        assert_eq!("v1\nf1\n", sources.fragment);
    }

    #[test]
    fn unknown_stage_markers_are_dropped_without_switching() {
        let text = "#shader fragment\nf1\n#shader geometry\nf2\n";

        let exact = ShaderSources::parse(text);
        let substring = ShaderSources::parse_with(text, MarkerMatching::Substring);

        assert_eq!("f1\nf2\n", exact.fragment);
        assert_eq!(exact, substring);
    }

    #[test]
    fn reads_sources_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DEFAULT_SHADER.as_bytes()).unwrap();

        let sources = ShaderSources::from_file(file.path()).unwrap();

        assert_eq!(ShaderSources::parse(DEFAULT_SHADER), sources);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(ShaderSources::from_file(dir.path().join("missing.glsl")).is_err());
    }
}
