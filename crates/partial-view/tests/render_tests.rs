/*
 * render_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Full-page and fragment rendering through Layouts and bare Partials.
 */

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use http::HeaderMap;
use partial_view::{
    ConnectorConfig, CsrfToken, DirFs, FileSystem, HeaderConnector, InMemoryFs, Localizer,
    Partial, PartialError, RenderContext, RequestHead, Service, TemplateFunction, Value,
};
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn request(uri: &str, headers: &[(&str, &str)]) -> RequestHead {
    let mut builder = http::Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    RequestHead::from_request(&builder.body(()).unwrap())
}

fn get() -> RequestHead {
    request("/", &[])
}

fn target(id: &str) -> RequestHead {
    request("/", &[("X-Target", id)])
}

fn memory_fs(files: &[(&str, &str)]) -> Arc<dyn FileSystem> {
    Arc::new(InMemoryFs::with_files(files.iter().copied()))
}

fn page_fs() -> Arc<dyn FileSystem> {
    memory_fs(&[
        (
            "templates/index.html",
            "<html><body>{{ child(\"content\") }}{{ child(\"footer\") }}</body></html>",
        ),
        ("templates/content.html", "<div>{{ data.Text }}</div>"),
        (
            "templates/footer.html",
            "<div {{ oobSwapIfEnabled(\"true\") }} id='footer'>{{ data.Text }}</div>",
        ),
    ])
}

fn content() -> Partial {
    Partial::with_id("content", ["templates/content.html"])
        .add_data("Text", "Welcome to the home page")
}

fn footer() -> Partial {
    Partial::with_id("footer", ["templates/footer.html"]).add_data("Text", "This is the footer")
}

#[test]
fn test_request_basic() {
    init_tracing();
    let fs = memory_fs(&[
        ("templates/index.html", "<html><body>{{ child(\"content\") }}</body></html>"),
        ("templates/content.html", "<div>{{ data.Text }}</div>"),
    ]);
    let service = Service::default();
    let layout = service
        .new_layout()
        .file_system(fs)
        .set(Partial::new(["templates/index.html"]).with_child(content()));
    let ctx = RenderContext::new();

    assert_eq!(
        layout.render_with_request(&ctx, &get()).unwrap(),
        "<html><body><div>Welcome to the home page</div></body></html>"
    );
    assert_eq!(
        layout.render_with_request(&ctx, &target("content")).unwrap(),
        "<div>Welcome to the home page</div>"
    );
}

#[test]
fn test_request_wrap() {
    init_tracing();
    let fs = memory_fs(&[
        ("templates/index.html", "<html><body>{{ child(\"content\") }}</body></html>"),
        ("templates/content.html", "<div>{{ data.Text }}</div>"),
    ]);
    let service = Service::default();
    let layout = service
        .new_layout()
        .file_system(fs)
        .set(content())
        .wrap(Partial::new(["templates/index.html"]));
    let ctx = RenderContext::new();

    assert_eq!(
        layout.render_with_request(&ctx, &get()).unwrap(),
        "<html><body><div>Welcome to the home page</div></body></html>"
    );
    assert_eq!(
        layout.render_with_request(&ctx, &target("content")).unwrap(),
        "<div>Welcome to the home page</div>"
    );
}

#[test]
fn test_request_oob() {
    init_tracing();
    let service = Service::default();
    let page = Partial::new(["templates/index.html"])
        .with_child(content())
        .with_oob(footer());
    let layout = service.new_layout().file_system(page_fs()).set(page);
    let ctx = RenderContext::new();

    assert_eq!(
        layout.render_with_request(&ctx, &get()).unwrap(),
        "<html><body><div>Welcome to the home page</div><div  id='footer'>This is the footer</div></body></html>"
    );
    assert_eq!(
        layout.render_with_request(&ctx, &target("content")).unwrap(),
        "<div>Welcome to the home page</div><div x-swap-oob=\"true\" id='footer'>This is the footer</div>"
    );
}

#[test]
fn test_request_oob_swap_with_wrapper() {
    init_tracing();
    let service = Service::default();
    let layout = service
        .new_layout()
        .file_system(page_fs())
        .set(content())
        .wrap(Partial::new(["templates/index.html"]).with_oob(footer()));
    let ctx = RenderContext::new();

    assert_eq!(
        layout.render_with_request(&ctx, &get()).unwrap(),
        "<html><body><div>Welcome to the home page</div><div  id='footer'>This is the footer</div></body></html>"
    );
    assert_eq!(
        layout.render_with_request(&ctx, &target("content")).unwrap(),
        "<div>Welcome to the home page</div><div x-swap-oob=\"true\" id='footer'>This is the footer</div>"
    );
}

#[test]
fn test_fragment_without_target_renders_wrapped_content() {
    init_tracing();
    let htmx = Arc::new(HeaderConnector::htmx(ConnectorConfig::default()));
    let service = Service::new(partial_view::Config {
        connector: Some(htmx),
        ..Default::default()
    });
    let layout = service
        .new_layout()
        .file_system(page_fs())
        .set(content())
        .wrap(Partial::new(["templates/index.html"]).with_oob(footer()));

    let out = layout
        .render_with_request(&RenderContext::new(), &request("/", &[("HX-Request", "true")]))
        .unwrap();
    assert_eq!(
        out,
        "<div>Welcome to the home page</div><div hx-swap-oob=\"true\" id='footer'>This is the footer</div>"
    );
}

#[test]
fn test_unreferenced_root_oob_is_appended() {
    init_tracing();
    let fs = memory_fs(&[
        ("templates/index.html", "<main>{{ child(\"content\") }}</main>"),
        ("templates/content.html", "<div>{{ data.Text }}</div>"),
        (
            "templates/footer.html",
            "<div {{ oobSwapIfEnabled(\"true\") }} id='footer'>{{ data.Text }}</div>",
        ),
    ]);
    let page = Partial::new(["templates/index.html"])
        .with_child(content())
        .with_oob(footer())
        .file_system(fs);

    let out = page.render_with_request(&RenderContext::new(), &get()).unwrap();
    assert_eq!(
        out,
        "<main><div>Welcome to the home page</div></main><div  id='footer'>This is the footer</div>"
    );
}

fn nested_tree() -> Partial {
    let fs = memory_fs(&[
        ("index.html", "<html>{{ child(\"content\") }}</html>"),
        ("content.html", "<section>{{ child(\"nested\") }}</section>"),
        ("nested.html", "<p>{{ upper(data.Text) }}</p>"),
    ]);
    Partial::new(["index.html"])
        .file_system(fs)
        .with_child(
            Partial::with_id("content", ["content.html"])
                .with_child(Partial::with_id("nested", ["nested.html"]).add_data("Text", "hello")),
        )
}

#[test]
fn test_deep_nested() {
    init_tracing();
    let page = nested_tree();
    let ctx = RenderContext::new();

    assert_eq!(
        page.render_with_request(&ctx, &get()).unwrap(),
        "<html><section><p>HELLO</p></section></html>"
    );
    assert_eq!(
        page.render_with_request(&ctx, &target("nested")).unwrap(),
        "<p>HELLO</p>"
    );
    assert_eq!(
        page.render_with_request(&ctx, &target("content")).unwrap(),
        "<section><p>HELLO</p></section>"
    );
}

#[test]
fn test_fragment_matches_direct_render() {
    init_tracing();
    let page = nested_tree();
    let ctx = RenderContext::new();
    let fs = memory_fs(&[
        ("content.html", "<section>{{ child(\"nested\") }}</section>"),
        ("nested.html", "<p>{{ upper(data.Text) }}</p>"),
    ]);

    let content = page.get_child("content").unwrap();
    let nested = content.get_child("nested").unwrap();
    for node in [content, nested] {
        let direct = (**node).clone().file_system(Arc::clone(&fs)).render(&ctx).unwrap();
        let fragment = page
            .render_with_request(&ctx, &target(node.get_id()))
            .unwrap();
        assert_eq!(fragment, direct, "fragment for '{}'", node.get_id());
    }
}

#[test]
fn test_missing_target_is_a_hard_failure() {
    init_tracing();
    let fs = memory_fs(&[(
        "templates/index.html",
        "<html><body>{{ child(\"content\") }}</body></html>",
    )]);
    let layout = Service::default()
        .new_layout()
        .file_system(fs)
        .set(Partial::new(["templates/index.html"]));

    let err = layout
        .render_with_request(&RenderContext::new(), &target("nonexistent"))
        .unwrap_err();
    assert!(matches!(
        &err,
        PartialError::TargetNotFound { target, parent } if target == "nonexistent" && parent == "root"
    ));
    assert_eq!(
        err.to_string(),
        "requested partial 'nonexistent' not found in parent 'root'"
    );
}

#[test]
fn test_oob_order_is_nearest_ancestor_first() {
    init_tracing();
    let fs = memory_fs(&[
        ("index.html", "{{ child(\"content\") }}"),
        ("content.html", "{{ child(\"nested\") }}"),
        ("nested.html", "<p>nested</p>"),
        ("oob.html", "<i {{ oobSwapIfEnabled(\"true\") }}>{{ id }}</i>"),
    ]);
    let oob = |id: &str| Partial::with_id(id, ["oob.html"]);
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .with_oob(oob("b"))
        .with_child(
            Partial::with_id("content", ["content.html"])
                .with_child(Partial::with_id("nested", ["nested.html"]))
                .with_oob(oob("c")),
        )
        .with_oob(oob("a"));

    let out = page
        .render_with_request(&RenderContext::new(), &target("nested"))
        .unwrap();
    assert_eq!(
        out,
        "<p>nested</p><i x-swap-oob=\"true\">c</i><i x-swap-oob=\"true\">b</i><i x-swap-oob=\"true\">a</i>"
    );
}

#[test]
fn test_targeting_an_oob_child() {
    init_tracing();
    let page = Partial::new(["templates/index.html"])
        .file_system(page_fs())
        .with_child(content())
        .with_oob(footer());
    let out = page
        .render_with_request(&RenderContext::new(), &target("footer"))
        .unwrap();
    assert_eq!(out, "<div  id='footer'>This is the footer</div>");

    let page = Partial::new(["templates/index.html"])
        .file_system(page_fs())
        .with_child(content())
        .with_oob(footer().always_swap_oob(true));
    let out = page
        .render_with_request(&RenderContext::new(), &target("footer"))
        .unwrap();
    assert_eq!(
        out,
        "<div  id='footer'>This is the footer</div><div x-swap-oob=\"true\" id='footer'>This is the footer</div>"
    );
}

#[test]
fn test_data_in_templates() {
    init_tracing();
    let service = Service::default();
    service.add_data("Title", "My Page");

    let fs = memory_fs(&[
        (
            "templates/index.html",
            "<html><head><title>{{ service.Title }}</title></head><body>{{ child(\"content\") }}</body></html>",
        ),
        (
            "templates/content.html",
            "<div>{{ layout.PageTitle }}</div><div>{{ layout.User }}</div><div>{{ data.Articles | join(\" \") }}</div>",
        ),
    ]);
    let articles = Value::from(vec!["Article 1", "Article 2", "Article 3"]);
    let page = Partial::new(["templates/index.html"])
        .with_child(Partial::with_id("content", ["templates/content.html"]).add_data("Articles", articles));

    let out = service
        .new_layout()
        .add_data("PageTitle", "Home Page")
        .add_data("User", "John Doe")
        .file_system(fs)
        .set(page)
        .render_with_request(&RenderContext::new(), &get())
        .unwrap();

    assert_eq!(
        out,
        "<html><head><title>My Page</title></head><body><div>Home Page</div><div>John Doe</div><div>Article 1 Article 2 Article 3</div></body></html>"
    );
}

#[test]
fn test_render_table() {
    init_tracing();
    let fs = memory_fs(&[
        (
            "table.html",
            "<table>{% for i in range(3) %}{{ child(\"row\", \"RowNumber\", i) }}{% endfor %}</table>",
        ),
        ("row.html", "<tr><td>{{ data.RowNumber }}</td></tr>"),
    ]);
    let table = Partial::new(["table.html"])
        .file_system(fs)
        .with_child(Partial::with_id("row", ["row.html"]));

    assert_eq!(
        table.render(&RenderContext::new()).unwrap(),
        "<table><tr><td>0</td></tr><tr><td>1</td></tr><tr><td>2</td></tr></table>"
    );
}

#[test]
fn test_child_content_errors_render_inline() {
    init_tracing();
    let fs = memory_fs(&[
        (
            "index.html",
            "[{{ child(\"missing\") }}][{{ childIf(\"missing\") }}][{{ child(\"row\", \"RowNumber\") }}][{{ child(\"row\", 1, 2) }}]",
        ),
        ("row.html", "row"),
    ]);
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .with_child(Partial::with_id("row", ["row.html"]));

    assert_eq!(
        page.render(&RenderContext::new()).unwrap(),
        "[child partial 'missing' not found in parent 'root'][][invalid child data for partial 'row'][invalid child data key for partial 'row', want string, got number]"
    );
}

#[test]
fn test_child_render_failure_aborts() {
    init_tracing();
    let fs = memory_fs(&[("index.html", "{{ child(\"broken\") }}")]);
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .with_child(Partial::with_id("broken", Vec::<String>::new()));

    let err = page.render(&RenderContext::new()).unwrap_err();
    assert!(matches!(err, PartialError::NoTemplates { ref id } if id == "broken"));
}

#[test]
fn test_no_templates() {
    let err = Partial::new(Vec::<String>::new())
        .render(&RenderContext::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "no templates provided for partial 'root'");
}

#[test]
fn test_protected_function_keeps_builtin_behavior() {
    init_tracing();
    let fs = memory_fs(&[
        ("index.html", "<main>{{ child(\"content\") }}</main>"),
        ("templates/content.html", "<div>{{ data.Text }}</div>"),
    ]);
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .add_function(
            "child",
            TemplateFunction::new(|_| Ok(Value::from("should not overwrite"))),
        )
        .with_child(content());

    assert_eq!(
        page.render(&RenderContext::new()).unwrap(),
        "<main><div>Welcome to the home page</div></main>"
    );
}

#[test]
fn test_functions_inherit_from_ancestors() {
    init_tracing();
    let fs = memory_fs(&[
        ("index.html", "{{ greet() }}|{{ child(\"content\") }}"),
        ("content.html", "{{ greet() }}"),
    ]);
    let constant = |text: &'static str| TemplateFunction::new(move |_| Ok(Value::from(text)));
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .add_function("greet", constant("parent"))
        .with_child(Partial::with_id("content", ["content.html"]));
    assert_eq!(page.render(&RenderContext::new()).unwrap(), "parent|parent");

    let page = page.with_child(
        Partial::with_id("content", ["content.html"]).add_function("greet", constant("local")),
    );
    assert_eq!(page.render(&RenderContext::new()).unwrap(), "parent|local");
}

#[test]
fn test_request_primitives() {
    init_tracing();
    let fs = memory_fs(&[(
        "items.html",
        concat!(
            "{{ requestTargetHeader() }}|{{ requestTargetValue() }}",
            "|{% if urlIs(\"/items/\") %}is{% endif %}",
            "|{% if urlStarts(\"/it\") %}starts{% endif %}",
            "|{% if urlContains(\"tem\") %}contains{% endif %}",
            "|{% if urlIs(\"/other\") %}other{% endif %}",
            "|{{ requestActionValue() }}",
            "|{{ requestTargetIfSelected(\"active\", \"other\", \"items\") }}",
        ),
    )]);
    let page = Partial::with_id("items", ["items.html"])
        .file_system(fs)
        .connector(Arc::new(HeaderConnector::htmx(ConnectorConfig {
            use_url_query: true,
        })));

    let req = request(
        "/items?action=save",
        &[("HX-Request", "true"), ("HX-Target", "items")],
    );
    assert_eq!(
        page.render_with_request(&RenderContext::new(), &req).unwrap(),
        "HX-Target|items|is|starts|contains||save|active"
    );
}

#[test]
fn test_render_without_request_disables_request_primitives() {
    init_tracing();
    let fs = memory_fs(&[(
        "index.html",
        concat!(
            "[{{ requestTargetValue() }}]",
            "[{% if urlIs(\"/\") %}root{% else %}none{% endif %}]",
            "[{{ url() }}]",
            "[{% if request is defined %}request{% else %}none{% endif %}]",
        ),
    )]);
    let page = Partial::new(["index.html"]).file_system(fs);
    assert_eq!(page.render(&RenderContext::new()).unwrap(), "[][none][][none]");
}

#[test]
fn test_url_keeps_slashes_and_escapes_ampersands() {
    init_tracing();
    let fs = memory_fs(&[("link.html", "<a href=\"{{ url() }}\">{{ url() }}</a>")]);
    let page = Partial::new(["link.html"]).file_system(fs);

    let out = page
        .render_with_request(&RenderContext::new(), &request("/items/list?page=2&sort=name", &[]))
        .unwrap();
    assert_eq!(
        out,
        "<a href=\"/items/list?page=2&amp;sort=name\">/items/list?page=2&amp;sort=name</a>"
    );
}

struct FixedCsrf;

impl CsrfToken for FixedCsrf {
    fn token(&self, _context: &RenderContext) -> String {
        "random-1234567890".to_string()
    }

    fn key(&self) -> String {
        "_csrf".to_string()
    }
}

struct German;

impl Localizer for German {
    fn locale(&self) -> String {
        "de_DE".to_string()
    }
}

#[test]
fn test_csrf_and_locale() {
    init_tracing();
    let fs = memory_fs(&[(
        "form.html",
        "<input name=\"{{ csrf.key }}\" value=\"{{ csrf.token }}\"> {{ locale }}",
    )]);
    let page = Partial::new(["form.html"]).file_system(fs);

    let out = page.render(&RenderContext::new()).unwrap();
    assert!(out.starts_with("<input name=\"X-CSRF-Token\" value=\"invalid-token-"));
    assert!(out.ends_with(" en_US"));

    let ctx = RenderContext::new()
        .with_csrf(Arc::new(FixedCsrf))
        .with_localizer(Arc::new(German));
    assert_eq!(
        page.render(&ctx).unwrap(),
        "<input name=\"_csrf\" value=\"random-1234567890\"> de_DE"
    );
}

#[test]
fn test_base_path_is_inherited() {
    init_tracing();
    let fs = memory_fs(&[
        ("index.html", "{{ basePath() }}|{{ child(\"nav\") }}|{{ child(\"admin\") }}"),
        ("link.html", "{{ basePath() }}/x"),
    ]);
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .base_path("/app")
        .with_child(Partial::with_id("nav", ["link.html"]))
        .with_child(Partial::with_id("admin", ["link.html"]).base_path("/admin"));

    assert_eq!(
        page.render(&RenderContext::new()).unwrap(),
        "/app|/app/x|/admin/x"
    );

    let bare = Partial::new(["link.html"]).file_system(memory_fs(&[("link.html", "{{ basePath() }}/x")]));
    assert_eq!(bare.render(&RenderContext::new()).unwrap(), "/x");
}

#[test]
fn test_response_headers() {
    init_tracing();
    let fs = memory_fs(&[
        ("index.html", "<main>{{ child(\"content\") }}</main>"),
        ("content.html", "content"),
    ]);
    let headers = BTreeMap::from([("X-Page".to_string(), "index".to_string())]);
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .response_headers(headers)
        .with_child(Partial::with_id("content", ["content.html"]));
    let ctx = RenderContext::new();

    // A fragment inherits the headers of its nearest ancestor.
    let rendered = page.render_response(&ctx, &target("content")).unwrap();
    assert_eq!(rendered.body, "content");
    assert_eq!(rendered.headers["x-page"], "index");

    let mut out = Vec::new();
    let mut response_headers = HeaderMap::new();
    page.write_with_request(&ctx, &get(), &mut response_headers, &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "<main>content</main>");
    assert_eq!(response_headers["x-page"], "index");

    let response = page.render_response(&ctx, &get()).unwrap().into_response();
    assert_eq!(response.headers()["content-type"], "text/html; charset=utf-8");
    assert_eq!(response.body(), "<main>content</main>");
}

#[test]
fn test_response_headers_come_from_the_returned_node() {
    init_tracing();
    let fs = memory_fs(&[
        ("index.html", "<main>{{ child(\"content\") }}</main>"),
        ("content.html", "content"),
        ("footer.html", "<footer {{ oobSwapIfEnabled(\"true\") }}>footer</footer>"),
    ]);
    let page_header = |value: &str| BTreeMap::from([("X-Page".to_string(), value.to_string())]);
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .response_headers(page_header("index"))
        .with_child(Partial::with_id("content", ["content.html"]).response_headers(page_header("content")))
        .with_oob(Partial::with_id("footer", ["footer.html"]).response_headers(page_header("footer")));
    let ctx = RenderContext::new();

    let full = page.render_response(&ctx, &get()).unwrap();
    assert_eq!(full.body, "<main>content</main><footer >footer</footer>");
    assert_eq!(full.headers["x-page"], "index");

    let fragment = page.render_response(&ctx, &target("content")).unwrap();
    assert_eq!(
        fragment.body,
        "content<footer x-swap-oob=\"true\">footer</footer>"
    );
    assert_eq!(fragment.headers["x-page"], "content");
}

#[test]
fn test_same_template_path_on_two_filesystems() {
    init_tracing();
    let site = |text: &str| {
        Partial::new(["index.html"])
            .file_system(memory_fs(&[("index.html", text)]))
            .use_cache(true)
    };
    let site_a = site("site A");
    let site_b = site("site B");
    let ctx = RenderContext::new();

    assert_eq!(site_a.render(&ctx).unwrap(), "site A");
    assert_eq!(site_b.render(&ctx).unwrap(), "site B");
    assert_eq!(site_a.render(&ctx).unwrap(), "site A");
}

#[test]
fn test_action_substituted_root_appends_its_oob_children() {
    init_tracing();
    let fs = memory_fs(&[
        ("index.html", "<main>page</main>"),
        ("banner.html", "<aside>banner</aside>"),
    ]);
    let page = Partial::new(["index.html"]).file_system(fs).with_action(|node, _| {
        Ok(node
            .clone()
            .with_oob(Partial::with_id("banner", ["banner.html"])))
    });

    assert_eq!(
        page.render(&RenderContext::new()).unwrap(),
        "<main>page</main><aside>banner</aside>"
    );
}

#[test]
fn test_invalid_response_header() {
    let fs = memory_fs(&[("index.html", "ok")]);
    let headers = BTreeMap::from([("bad header".to_string(), "x".to_string())]);
    let page = Partial::new(["index.html"])
        .file_system(fs)
        .response_headers(headers);

    let err = page.render_response(&RenderContext::new(), &get()).unwrap_err();
    assert!(matches!(err, PartialError::InvalidHeader { ref name } if name == "bad header"));
}

#[test]
fn test_concurrent_renders_share_definitions() {
    init_tracing();
    let page = Arc::new(nested_tree().use_cache(true));

    thread::scope(|scope| {
        for i in 0..8 {
            let page = Arc::clone(&page);
            scope.spawn(move || {
                let req = if i % 2 == 0 { get() } else { target("nested") };
                let expected = if i % 2 == 0 {
                    "<html><section><p>HELLO</p></section></html>"
                } else {
                    "<p>HELLO</p>"
                };
                for _ in 0..10 {
                    assert_eq!(
                        page.render_with_request(&RenderContext::new(), &req).unwrap(),
                        expected
                    );
                }
            });
        }
    });
}

#[test]
fn test_templates_from_directory() {
    init_tracing();
    let fixtures = concat!(env!("CARGO_MANIFEST_DIR"), "/test-fixtures");
    let page = Partial::new(["index.html"])
        .file_system(Arc::new(DirFs::new(fixtures)))
        .with_child(Partial::with_id("content", ["content.html"]).add_data("Text", "From disk"));

    assert_eq!(
        page.render(&RenderContext::new()).unwrap(),
        "<html><body><div>From disk</div></body></html>"
    );
}
