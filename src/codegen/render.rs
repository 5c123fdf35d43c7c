use serde_json::Value;

use crate::request::{Body, Request, StringMap};
use crate::strings::{indent, pluralize};
use crate::synth::{Class, Method};

use super::literal;
use super::{Flavor, GenerateOptions};

const STANDARD_VERBS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Verbs whose httpx shorthand takes no body arguments
const HTTPX_BODYLESS: &[&str] = &["GET", "HEAD", "OPTIONS", "DELETE"];

/// Longest single-line argument list before arguments are split one per line
const MAX_INLINE_ARGS: usize = 72;

/// One keyword argument of a client call
struct Kwarg {
    /// Keyword name in the call
    keyword: &'static str,
    /// Variable name in standalone snippets
    variable: &'static str,
    /// Python literal, rendered one indent level deep
    literal: String,
    is_body: bool,
}

/// Request data, filtered down to what the generated call passes
struct CallData<'a> {
    request: &'a Request,
    headers: StringMap,
    cookies: StringMap,
}

impl<'a> CallData<'a> {
    fn kwargs(&self, flavor: Flavor) -> Vec<Kwarg> {
        let mut kwargs = Vec::new();
        let mut push = |keyword, variable, literal, is_body| {
            kwargs.push(Kwarg { keyword, variable, literal, is_body })
        };

        if !self.request.params.is_empty() {
            push("params", "params", literal::dict(&self.request.params, 1), false);
        }

        match &self.request.body {
            Body::None => {}
            Body::Form(form) => {
                if !form.is_empty() {
                    push("data", "data", literal::dict(form, 1), true);
                }
            }
            Body::Json(value) => {
                if !is_empty_json(value) {
                    push("json", "json_data", literal::value(value, 1), true);
                }
            }
            Body::Multipart { files, fields } if flavor == Flavor::Aiohttp => {
                // aiohttp has no `files=`; bytes values turn the form into multipart
                let mut entries: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", literal::string(k), literal::string(v)))
                    .collect();
                entries.extend(files.iter().map(|(k, f)| {
                    format!("{}: {}", literal::string(k), literal::bytes(&f.content))
                }));
                if !entries.is_empty() {
                    push("data", "data", entries_block(entries), true);
                }
            }
            Body::Multipart { files, fields } => {
                if !fields.is_empty() {
                    push("data", "data", literal::dict(fields, 1), true);
                }
                if !files.is_empty() {
                    push("files", "files", literal::files(files, 1), true);
                }
            }
        }

        if !self.headers.is_empty() {
            push("headers", "headers", literal::dict(&self.headers, 1), false);
        }
        if !self.cookies.is_empty() {
            push("cookies", "cookies", literal::dict(&self.cookies, 1), false);
        }

        kwargs
    }

    /// `"""GET https://httpbin.org/get. Contains 1 param and 2 headers."""`
    fn docstring(&self) -> String {
        let (data, json, files) = match &self.request.body {
            Body::None => (0, 0, 0),
            Body::Form(form) => (form.len(), 0, 0),
            Body::Json(value) => (0, json_items(value), 0),
            Body::Multipart { files, fields } => (fields.len(), 0, files.len()),
        };

        let details: Vec<String> = [
            (self.request.params.len(), "param"),
            (data, "data item"),
            (json, "json item"),
            (files, "file"),
            (self.headers.len(), "header"),
            (self.cookies.len(), "cookie"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, noun)| pluralize(count, noun))
        .collect();

        let summary = match details.as_slice() {
            [] => "no data".to_string(),
            [only] => only.clone(),
            [init @ .., last] => format!("{} and {}", init.join(", "), last),
        };

        let text = format!("{} {}. Contains {}.", self.request.method, self.request.url, summary);
        format!("\"\"\"{}\"\"\"", text.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn json_items(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        Value::Null => 0,
        _ => 1,
    }
}

fn entries_block(entries: Vec<String>) -> String {
    let mut out = String::from("{\n");
    for entry in entries {
        out.push_str("        ");
        out.push_str(&entry);
        out.push_str(",\n");
    }
    out.push_str("    }");
    out
}

/// `(a, b)` on one line when short, otherwise one argument per line
fn call_args(args: &[String]) -> String {
    let inline = args.join(", ");
    if args.iter().all(|a| !a.contains('\n')) && inline.len() <= MAX_INLINE_ARGS {
        return format!("({})", inline);
    }

    let mut out = String::from("(\n");
    for arg in args {
        out.push_str("    ");
        out.push_str(arg);
        out.push_str(",\n");
    }
    out.push(')');
    out
}

/// `target.get(url, ...)`, falling back to `target.request("VERB", url, ...)`
fn client_call(target: &str, request: &Request, flavor: Flavor, kwargs: &[(&str, String, bool)]) -> String {
    let method = request.method.as_str();
    let has_body = kwargs.iter().any(|(_, _, is_body)| *is_body);
    let shorthand = STANDARD_VERBS.contains(&method)
        && !(flavor.is_httpx() && has_body && HTTPX_BODYLESS.contains(&method));

    let mut args = Vec::with_capacity(kwargs.len() + 2);
    if !shorthand {
        args.push(literal::string(method));
    }
    args.push(literal::string(&request.url.to_string()));
    args.extend(kwargs.iter().map(|(keyword, value, _)| format!("{}={}", keyword, value)));

    let function = if shorthand {
        method.to_ascii_lowercase()
    } else {
        "request".to_string()
    };
    format!("{}.{}{}", target, function, call_args(&args))
}

fn json_or_text(flavor: Flavor, response: &str, return_text: bool) -> String {
    match (flavor, return_text) {
        (Flavor::Aiohttp, false) => format!("await {}.json()", response),
        (Flavor::Aiohttp, true) => format!("await {}.text()", response),
        (_, false) => format!("{}.json()", response),
        (_, true) => format!("{}.text", response),
    }
}

fn import_block(flavor: Flavor, standalone: bool) -> String {
    if standalone && flavor.is_async() {
        format!("import asyncio\n\nimport {}\n", flavor.module())
    } else {
        format!("import {}\n", flavor.module())
    }
}

/// A module holding one class per site
pub(super) fn module(classes: &[Class], options: &GenerateOptions) -> String {
    let flavor = options.flavor();
    let rendered: Vec<String> = classes.iter().map(|c| class(c, options, flavor)).collect();
    format!("{}\n\n{}\n", import_block(flavor, false), rendered.join("\n\n\n"))
}

fn class(class: &Class, options: &GenerateOptions, flavor: Flavor) -> String {
    let shared_headers = if options.no_headers {
        StringMap::new()
    } else {
        class.shared_headers.clone()
    };
    let shared_cookies = if options.no_cookies {
        StringMap::new()
    } else {
        class.shared_cookies.clone()
    };
    let has_init = !shared_headers.is_empty() || !shared_cookies.is_empty();

    let mut members = Vec::new();
    if has_init {
        members.push(initializer(&shared_headers, &shared_cookies, flavor));
    }
    for method in &class.methods {
        members.push(class_method(class, method, options, flavor, has_init));
    }

    let body: Vec<String> = members.iter().map(|m| indent(m, 4)).collect();
    format!("class {}:\n{}", class.name, body.join("\n\n"))
}

fn initializer(headers: &StringMap, cookies: &StringMap, flavor: Flavor) -> String {
    let mut lines = vec!["def __init__(self):".to_string()];

    match flavor {
        Flavor::Requests => {
            lines.push("    self._session = requests.Session()".to_string());
            if !headers.is_empty() {
                lines.push(indent(&format!("self._session.headers.update({})", literal::dict(headers, 0)), 4));
            }
            if !cookies.is_empty() {
                lines.push(indent(&format!("self._session.cookies.update({})", literal::dict(cookies, 0)), 4));
            }
        }
        Flavor::Httpx | Flavor::HttpxAsync => {
            let constructor = if flavor == Flavor::Httpx { "Client" } else { "AsyncClient" };
            let mut args = Vec::new();
            if !headers.is_empty() {
                args.push(format!("headers={}", literal::dict(headers, 1)));
            }
            if !cookies.is_empty() {
                args.push(format!("cookies={}", literal::dict(cookies, 1)));
            }
            lines.push(indent(&format!("self._client = httpx.{}{}", constructor, call_args(&args)), 4));
        }
        Flavor::Aiohttp => {
            if !headers.is_empty() {
                lines.push(indent(&format!("self._headers = {}", literal::dict(headers, 0)), 4));
            }
            if !cookies.is_empty() {
                lines.push(indent(&format!("self._cookies = {}", literal::dict(cookies, 0)), 4));
            }
        }
    }

    lines.join("\n")
}

fn class_method(class: &Class, method: &Method, options: &GenerateOptions, flavor: Flavor, has_init: bool) -> String {
    let data = CallData {
        request: &method.request,
        headers: if options.no_headers {
            StringMap::new()
        } else {
            method.unshared_headers(class)
        },
        cookies: if options.no_cookies {
            StringMap::new()
        } else {
            method.unshared_cookies(class)
        },
    };
    let kwargs: Vec<(&str, String, bool)> = data
        .kwargs(flavor)
        .into_iter()
        .map(|k| (k.keyword, k.literal, k.is_body))
        .collect();

    let body = match flavor {
        Flavor::Requests | Flavor::Httpx => {
            let target = match (flavor, has_init) {
                (Flavor::Requests, true) => "self._session",
                (Flavor::Requests, false) => "requests",
                (_, true) => "self._client",
                (_, false) => "httpx",
            };
            let call = client_call(target, &method.request, flavor, &kwargs);
            format!("return {}", json_or_text(flavor, &call, options.return_text))
        }
        Flavor::HttpxAsync => {
            let returned = json_or_text(flavor, "response", options.return_text);
            if has_init {
                let call = client_call("self._client", &method.request, flavor, &kwargs);
                format!("response = await {}\nreturn {}", call, returned)
            } else {
                let call = client_call("client", &method.request, flavor, &kwargs);
                format!(
                    "async with httpx.AsyncClient() as client:\n{}",
                    indent(&format!("response = await {}\nreturn {}", call, returned), 4)
                )
            }
        }
        Flavor::Aiohttp => {
            let mut session_args = Vec::new();
            if has_init && !class.shared_headers.is_empty() && !options.no_headers {
                session_args.push("headers=self._headers".to_string());
            }
            if has_init && !class.shared_cookies.is_empty() && !options.no_cookies {
                session_args.push("cookies=self._cookies".to_string());
            }
            aiohttp_exchange(&method.request, flavor, &kwargs, &session_args, options.return_text)
        }
    };

    let keyword = if flavor.is_async() { "async def" } else { "def" };
    format!(
        "{} {}(self):\n{}\n{}",
        keyword,
        method.name,
        indent(&data.docstring(), 4),
        indent(&body, 4)
    )
}

fn aiohttp_exchange(
    request: &Request,
    flavor: Flavor,
    kwargs: &[(&str, String, bool)],
    session_args: &[String],
    return_text: bool,
) -> String {
    let call = client_call("session", request, flavor, kwargs);
    format!(
        "async with aiohttp.ClientSession({}) as session:\n    async with {} as response:\n        return {}",
        session_args.join(", "),
        indent(&call, 4).trim_start(),
        json_or_text(flavor, "response", return_text)
    )
}

/// A standalone script reproducing one request
pub(super) fn snippet(request: &Request, options: &GenerateOptions) -> String {
    let flavor = options.flavor();
    let data = CallData {
        request,
        headers: if options.no_headers {
            StringMap::new()
        } else {
            request.headers.clone()
        },
        cookies: if options.no_cookies {
            StringMap::new()
        } else {
            request.cookies.clone()
        },
    };
    let kwargs = data.kwargs(flavor);

    let mut out = import_block(flavor, true);
    out.push_str("\n\n");

    if !kwargs.is_empty() {
        for kwarg in &kwargs {
            // literals are rendered one level deep; variables live at module level
            out.push_str(&format!("{} = {}\n", kwarg.variable, dedent_literal(&kwarg.literal)));
        }
        out.push('\n');
    }

    let passed: Vec<(&str, String, bool)> = kwargs
        .iter()
        .map(|k| (k.keyword, k.variable.to_string(), k.is_body))
        .collect();
    let return_text = options.return_text;

    let main_body = match flavor {
        Flavor::Requests | Flavor::Httpx => {
            let call = client_call(flavor.module(), request, flavor, &passed);
            out.push_str(&format!("response = {}\n", call));
            out.push_str(&format!("result = {}\n", json_or_text(flavor, "response", return_text)));
            return out;
        }
        Flavor::HttpxAsync => {
            let call = client_call("client", request, flavor, &passed);
            format!(
                "async with httpx.AsyncClient() as client:\n{}",
                indent(
                    &format!("response = await {}\nreturn {}", call, json_or_text(flavor, "response", return_text)),
                    4
                )
            )
        }
        Flavor::Aiohttp => aiohttp_exchange(request, flavor, &passed, &[], return_text),
    };

    if !kwargs.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!(
        "async def main():\n{}\n\n\nresult = asyncio.run(main())\n",
        indent(&main_body, 4)
    ));
    out
}

/// Shift a literal rendered at level one back to module level
fn dedent_literal(literal: &str) -> String {
    literal
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line
            } else {
                line.strip_prefix("    ").unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
