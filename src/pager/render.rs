//! Pager navigation markup. Pure function of the position and a URL template.

use std::fmt::Write;

/// Pages shown on each side of the current one before eliding.
const WINDOW: usize = 2;

/// Render an HTML `<nav>` for page `current` of `total_pages`.
///
/// `{page}` in `url_template` is replaced with each page number. Returns an
/// empty string when there is at most one page.
#[must_use]
pub fn render_navigation(current: usize, total_pages: usize, url_template: &str) -> String {
    if total_pages <= 1 {
        return String::new();
    }
    let current = current.clamp(1, total_pages);
    let href = |page: usize| escape(&url_template.replace("{page}", &page.to_string()));

    let mut out = String::from("<nav class=\"pager\"><ul>");
    if current > 1 {
        let _ = write!(
            out,
            "<li class=\"previous\"><a href=\"{}\" rel=\"prev\">&laquo;</a></li>",
            href(current - 1)
        );
    }

    let mut last_shown = 0;
    for page in 1..=total_pages {
        let near = page.abs_diff(current) <= WINDOW;
        if page != 1 && page != total_pages && !near {
            continue;
        }
        if last_shown != 0 && page > last_shown + 1 {
            out.push_str("<li class=\"gap\">&hellip;</li>");
        }
        if page == current {
            let _ = write!(out, "<li class=\"active\"><span>{page}</span></li>");
        } else {
            let _ = write!(out, "<li><a href=\"{}\">{page}</a></li>", href(page));
        }
        last_shown = page;
    }

    if current < total_pages {
        let _ = write!(
            out,
            "<li class=\"next\"><a href=\"{}\" rel=\"next\">&raquo;</a></li>",
            href(current + 1)
        );
    }
    out.push_str("</ul></nav>");
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_renders_nothing() {
        assert_eq!(render_navigation(1, 1, "/todo?page={page}"), "");
        assert_eq!(render_navigation(1, 0, "/todo?page={page}"), "");
    }

    #[test]
    fn first_page_has_no_previous_link() {
        let html = render_navigation(1, 3, "/todo?page={page}");
        assert!(!html.contains("rel=\"prev\""));
        assert!(html.contains("<li class=\"active\"><span>1</span></li>"));
        assert!(html.contains("<a href=\"/todo?page=3\">3</a>"));
        assert!(html.contains("href=\"/todo?page=2\" rel=\"next\""));
    }

    #[test]
    fn distant_pages_are_elided() {
        let html = render_navigation(10, 20, "/p/{page}");
        assert!(html.contains("<a href=\"/p/1\">1</a></li><li class=\"gap\">"));
        assert!(html.contains("<a href=\"/p/8\">8</a>"));
        assert!(!html.contains("<a href=\"/p/7\">7</a>"));
        assert!(html.contains("<a href=\"/p/20\">20</a>"));
    }

    #[test]
    fn ampersands_are_escaped() {
        let html = render_navigation(2, 2, "/t?a=1&page={page}");
        assert!(html.contains("/t?a=1&amp;page=1"));
    }
}
