//! Static HTML pages served by the form routes.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Magpie</title>
</head>
<body>
    <h1>Welcome</h1>
    <p>Download social data as CSV.</p>
    <ul>
        <li><a href="/twitter">Twitter query</a></li>
        <li><a href="/reddit">Reddit query</a></li>
    </ul>
</body>
</html>
"#;

pub const TWITTER_FORM_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Twitter query</title>
</head>
<body>
    <h1>Twitter</h1>
    <p>Please define your Twitter query.</p>
    <form action="/twitter-submit" method="post">
        <label for="string">Search string</label>
        <input id="string" type="text" name="string" required>
        <label for="start-date">Start date</label>
        <input id="start-date" type="date" name="start-date">
        <label for="end-date">End date</label>
        <input id="end-date" type="date" name="end-date">
        <label for="max">Max results</label>
        <input id="max" type="number" name="max" min="1">
        <button type="submit">Submit</button>
    </form>
</body>
</html>
"#;

pub const REDDIT_FORM_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Reddit query</title>
</head>
<body>
    <h1>Reddit</h1>
    <p>Please define your Reddit query.</p>

    <h2>Single submission</h2>
    <form action="/reddit-submission-submit" method="post">
        <label for="submission-id">Submission id</label>
        <input id="submission-id" type="text" name="submission_id" required>
        <button type="submit">Submit</button>
    </form>

    <h2>Subreddit listing</h2>
    <form action="/reddit-subreddit-submit" method="post">
        <label for="subreddit">Subreddit</label>
        <input id="subreddit" type="text" name="subreddit" required>
        <label for="kind">Kind</label>
        <select name="kind" id="kind" required>
            <option value="hot">hot</option>
            <option value="new">new</option>
            <option value="top">top</option>
        </select>
        <label for="limit">Limit</label>
        <input id="limit" type="number" name="limit" min="1">
        <button type="submit">Submit</button>
    </form>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_page_greets() {
        assert!(INDEX_HTML.contains("<h1>Welcome</h1>"));
    }

    #[test]
    fn twitter_form_carries_the_expected_fields() {
        assert!(TWITTER_FORM_HTML.contains("Please define your Twitter query."));
        assert!(TWITTER_FORM_HTML.contains(r#"<input id="string" type="text" name="string" required>"#));
        assert!(TWITTER_FORM_HTML.contains(r#"<button type="submit">Submit</button>"#));
    }

    #[test]
    fn reddit_form_carries_both_query_shapes() {
        assert!(REDDIT_FORM_HTML.contains("Please define your Reddit query."));
        assert!(REDDIT_FORM_HTML
            .contains(r#"<input id="submission-id" type="text" name="submission_id" required>"#));
        assert!(REDDIT_FORM_HTML.contains(r#"<input id="subreddit" type="text" name="subreddit" required>"#));
        assert!(REDDIT_FORM_HTML.contains(r#"<select name="kind" id="kind" required>"#));
    }
}
