/// Two sibling divs told apart by class.
pub const DIVS: &str = r#"<html><body><div class="y"/><div class="x"/></body></html>"#;

/// Three list items spread over two lists in different subtrees.
pub const SCATTERED_ITEMS: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <ul id="menu"><li>one</li><li class="current">two</li></ul>
    <div><ol><li>three</li></ol></div>
  </body>
</html>"#;

/// A flat run of items under one parent.
pub const ITEMS: &str = "<list><item>a</item><item>b</item><item>c</item></list>";

/// An SVG island inside an XHTML page.
pub const XHTML_WITH_SVG: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:svg="http://www.w3.org/2000/svg">
  <body>
    <svg:svg><svg:rect width="10"/></svg:svg>
    <p xml:lang="en-GB">text</p>
  </body>
</html>"#;
