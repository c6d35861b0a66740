//! The `{% ads %}` template tag. The tag takes no arguments and always
//! expands to the same AdSense block; the publisher and slot identifiers are
//! placeholders to be replaced before deployment.

/// The name of the ad tag, as written between `{%` and `%}`.
pub const ADS_TAG: &str = "ads";

const ADS_SNIPPET: &str = concat!(
    r#"<div style="margin: 0 auto; padding: .8em 0;">"#,
    r#"<script async src="//pagead2.googlesyndication.com/pagead/js/adsbygoogle.js"></script>"#,
    r#"<ins class="adsbygoogle" style="display:block" data-ad-client="xxxxx" "#,
    r#"data-ad-slot="yyyyyy" data-ad-format="auto"></ins>"#,
    r#"<script>(adsbygoogle = window.adsbygoogle || []).push({});</script>"#,
    r#"</div>"#,
);

/// Returns the ad block the `{% ads %}` tag expands to.
pub fn ads_snippet() -> &'static str {
    ADS_SNIPPET
}

/// Replaces every `{% ads %}` in `input` with [`ads_snippet`]. Whitespace
/// inside the delimiters is optional (`{%ads%}` works too). Any other
/// `{% ... %}` tag is left exactly as written for the host template engine
/// to handle, as is an unterminated `{%`.
pub fn expand_tags(input: &str) -> String {
    const OPEN: &str = "{%";
    const CLOSE: &str = "%}";

    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let end = match after_open.find(CLOSE) {
            Some(end) => end,
            None => break,
        };

        output.push_str(&rest[..start]);
        if after_open[..end].trim() == ADS_TAG {
            output.push_str(ADS_SNIPPET);
        } else {
            output.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]);
        }
        rest = &after_open[end + CLOSE.len()..];
    }
    output.push_str(rest);
    output
}
