//! Substitution of positional arguments into `{}` message templates.

use crate::argument::Argument;
use crate::render::Renderer;

const ANCHOR: &str = "{}";
const ESCAPE: u8 = b'\\';

/// Replaces each `{}` anchor in `template` with the text of the next argument.
///
/// - `\{}` is a literal `{}` and does not consume an argument.
/// - `\\{}` is a literal backslash followed by the argument.
/// - Anchors without an argument stay as they are, surplus arguments are ignored.
///
/// # Examples
///
/// ```rust
/// use logfields::arguments;
/// use logfields::message::format_message;
/// use logfields::render::Renderer;
/// use logfields::structured::key_value;
///
/// let args = arguments![key_value("user", "alice"), vec![1, 2]];
/// let text = format_message("login by {} with {} and {}", &args, &mut Renderer::new());
/// assert_eq!(text, "login by user=alice with [1, 2] and {}");
/// ```
pub fn format_message(template: &str, arguments: &[Argument], renderer: &mut Renderer) -> String {
    let bytes = template.as_bytes();
    let mut output = String::with_capacity(template.len() + 16 * arguments.len());
    let mut start = 0;
    let mut arguments = arguments.iter();
    let mut next = arguments.next();

    while let Some(argument) = next {
        let Some(offset) = template[start..].find(ANCHOR) else {
            break;
        };
        let anchor = start + offset;

        let escaped = anchor > 0 && bytes[anchor - 1] == ESCAPE;
        let double_escaped = escaped && anchor > 1 && bytes[anchor - 2] == ESCAPE;

        if escaped && !double_escaped {
            output.push_str(&template[start..anchor - 1]);
            output.push('{');
            start = anchor + 1;
            continue;
        }

        // The second backslash of a double escape is dropped.
        let literal_end = if double_escaped { anchor - 1 } else { anchor };
        output.push_str(&template[start..literal_end]);
        output.push_str(&argument.render(renderer));
        start = anchor + ANCHOR.len();
        next = arguments.next();
    }

    output.push_str(&template[start..]);
    output
}
