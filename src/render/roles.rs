//! Role classifiers. Closed enumerations at the API boundary, but
//! tolerant of roles the driver reports that we've never heard of: unknown
//! roles are skipped or default to `button`, never a panic.

/// The closed `InteractiveElement.type` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Button,
    Link,
    TextInput,
    Select,
    Checkbox,
    Radio,
    Toggle,
    Textarea,
    FileInput,
    Range,
    DateInput,
    ColorInput,
}

impl ElementType {
    /// Short id prefix: `textarea/file_input/range/date_input/color_input`
    /// all share `inp`.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ElementType::Button => "btn",
            ElementType::Link => "lnk",
            ElementType::TextInput => "inp",
            ElementType::Select => "sel",
            ElementType::Checkbox => "chk",
            ElementType::Radio => "rad",
            ElementType::Toggle => "tog",
            ElementType::Textarea => "inp",
            ElementType::FileInput => "inp",
            ElementType::Range => "inp",
            ElementType::DateInput => "inp",
            ElementType::ColorInput => "inp",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Button => "button",
            ElementType::Link => "link",
            ElementType::TextInput => "text_input",
            ElementType::Select => "select",
            ElementType::Checkbox => "checkbox",
            ElementType::Radio => "radio",
            ElementType::Toggle => "toggle",
            ElementType::Textarea => "textarea",
            ElementType::FileInput => "file_input",
            ElementType::Range => "range",
            ElementType::DateInput => "date_input",
            ElementType::ColorInput => "color_input",
        }
    }
}

pub const LANDMARK_ID_PREFIX: &str = "rgn";
pub const HEADING_ID_PREFIX: &str = "hdg";
pub const FORM_ID_PREFIX: &str = "frm";
pub const UNKNOWN_ID_PREFIX: &str = "el";

/// `banner, navigation, main, complementary, contentinfo, search, form, region`.
pub fn is_landmark_role(role: &str) -> bool {
    matches!(
        role,
        "banner"
            | "navigation"
            | "main"
            | "complementary"
            | "contentinfo"
            | "search"
            | "form"
            | "region"
    )
}

pub fn is_heading_role(role: &str) -> bool {
    role == "heading"
}

/// Interactive roles: the element-type set's AX roles, plus
/// `menuitem, menuitemcheckbox, menuitemradio, tab, treeitem`.
pub fn is_interactive_role(role: &str) -> bool {
    matches!(
        role,
        "button"
            | "link"
            | "textbox"
            | "searchbox"
            | "combobox"
            | "listbox"
            | "checkbox"
            | "radio"
            | "switch"
            | "slider"
            | "spinbutton"
            | "menuitem"
            | "menuitemcheckbox"
            | "menuitemradio"
            | "tab"
            | "treeitem"
    )
}

/// Content roles whose accessible name aggregates descendant text.
pub fn is_content_role(role: &str) -> bool {
    matches!(
        role,
        "heading" | "paragraph" | "listitem" | "cell" | "label" | "legend" | "caption" | "blockquote"
    )
}

pub fn is_static_text_role(role: &str) -> bool {
    matches!(role, "StaticText" | "text")
}

/// Maps an AX role to its `ElementType`. `multiline` steers `textbox`/
/// `searchbox` to `Textarea`. Date/file/color inputs are detected from AX
/// `properties`/`value` shape rather than role (the AX tree exposes no
/// dedicated role for them); unknown interactive roles default to `Button`.
pub fn role_to_element_type(role: &str, multiline: bool, value_hint: Option<&str>) -> ElementType {
    match role {
        "button" | "menuitem" | "tab" => ElementType::Button,
        "link" => ElementType::Link,
        "textbox" | "searchbox" => {
            if multiline {
                ElementType::Textarea
            } else {
                match value_hint {
                    Some("date") => ElementType::DateInput,
                    Some("color") => ElementType::ColorInput,
                    Some("file") => ElementType::FileInput,
                    _ => ElementType::TextInput,
                }
            }
        }
        "combobox" | "listbox" => ElementType::Select,
        "checkbox" | "menuitemcheckbox" => ElementType::Checkbox,
        "radio" | "menuitemradio" => ElementType::Radio,
        "switch" => ElementType::Toggle,
        "slider" | "spinbutton" => ElementType::Range,
        "treeitem" => ElementType::Button,
        _ => ElementType::Button,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_defaults_to_button() {
        assert_eq!(
            role_to_element_type("some-future-role", false, None).as_str(),
            "button"
        );
    }

    #[test]
    fn multiline_textbox_is_textarea() {
        assert_eq!(role_to_element_type("textbox", true, None).as_str(), "textarea");
    }

    #[test]
    fn shared_inp_prefix() {
        for t in [
            ElementType::Textarea,
            ElementType::FileInput,
            ElementType::Range,
            ElementType::DateInput,
            ElementType::ColorInput,
            ElementType::TextInput,
        ] {
            assert_eq!(t.id_prefix(), "inp");
        }
    }

    #[test]
    fn landmark_and_heading_roles() {
        assert!(is_landmark_role("navigation"));
        assert!(!is_landmark_role("button"));
        assert!(is_heading_role("heading"));
        assert!(!is_heading_role("button"));
    }
}
