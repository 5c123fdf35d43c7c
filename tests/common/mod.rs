//! Common test utilities for reqforge integration tests
//!
//! This module provides shared test infrastructure including:
//! - Captures copied from Chromium's "Copy as fetch" / "Copy as PowerShell"
//! - The requests those captures must parse into
//! - CLI invocation helpers with an isolated config directory

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use indexmap::IndexMap;
use serde_json::json;
use tempfile::TempDir;

use reqforge::request::{Body, FileField, Request, StringMap, Url};

pub const FETCH_EXAMPLE_ONE: &str = r##"fetch("https://httpbin.org/cookies", {
  "headers": {
    "accept": "application/json",
    "accept-language": "en-US,en;q=0.9",
    "sec-ch-ua": "\"Chromium\";v=\"94\", \" Not A;Brand\";v=\"99\", \"Opera GX\";v=\"80\"",
    "sec-ch-ua-mobile": "?0",
    "sec-ch-ua-platform": "\"Windows\"",
    "sec-fetch-dest": "empty",
    "sec-fetch-mode": "cors",
    "sec-fetch-site": "same-origin",
    "cookie": "hello=world"
  },
  "referrer": "https://httpbin.org/",
  "referrerPolicy": "strict-origin-when-cross-origin",
  "body": null,
  "method": "GET",
  "mode": "cors"
});"##;

pub const POWERSHELL_EXAMPLE_ONE: &str = r##"$session = New-Object Microsoft.PowerShell.Commands.WebRequestSession
$session.UserAgent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/94.0.4606.61 Safari/537.36 OPR/80.0.4170.48"
$session.Cookies.Add((New-Object System.Net.Cookie("hello-from", "autorequests", "/", "httpbin.org")))
Invoke-WebRequest -UseBasicParsing -Uri "https://httpbin.org/cookies" `
-WebSession $session `
-Headers @{
"method"="GET"
  "authority"="httpbin.org"
  "scheme"="https"
  "path"="/cookies"
  "sec-ch-ua"="`"Chromium`";v=`"94`", `" Not A;Brand`";v=`"99`", `"Opera GX`";v=`"80`""
  "accept"="application/json"
  "sec-ch-ua-mobile"="?0"
  "sec-ch-ua-platform"="`"Windows`""
  "sec-fetch-site"="same-origin"
  "sec-fetch-mode"="cors"
  "sec-fetch-dest"="empty"
  "referer"="https://httpbin.org/"
  "accept-encoding"="gzip, deflate, br"
  "accept-language"="en-US,en;q=0.9"
}"##;

/// Same dialect, hand-converted to backslash escapes and continuations
pub const POWERSHELL_EXAMPLE_TWO: &str = r##"$session = New-Object Microsoft.PowerShell.Commands.WebRequestSession
$session.UserAgent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/94.0.4606.61 Safari/537.36 OPR/80.0.4170.48"
Invoke-WebRequest -UseBasicParsing -Uri "https://dev-api.impb.in/v1/document" \
-Method "POST" \
-WebSession $session \
-Headers @{
"method"="POST"
  "authority"="dev-api.impb.in"
  "scheme"="https"
  "path"="/v1/document"
  "sec-ch-ua"="\"Chromium\";v=\"94\", \" Not A;Brand\";v=\"99\", \"Opera GX\";v=\"80\""
  "sec-ch-ua-mobile"="?0"
  "sec-ch-ua-platform"="\"Windows\""
  "accept"="*/*"
  "origin"="https://dev.impb.in"
  "sec-fetch-site"="same-site"
  "sec-fetch-mode"="cors"
  "sec-fetch-dest"="empty"
  "referer"="https://dev.impb.in/"
  "accept-encoding"="gzip, deflate, br"
  "accept-language"="en-US,en;q=0.9"
} \
-ContentType "application/json" \
-Body "{\"content\":\"yeah\",\"settings\":{\"longUrls\":false,\"shortUrls\":false,\"instantDelete\":false,\"encrypted\":false,\"imageEmbed\":false,\"expiration\":14,\"public\":false,\"editors\":[],\"language\":\"python\"}}""##;

/// Multipart body whose boundary is only declared by `-ContentType`
pub const POWERSHELL_MULTIPART: &str = r##"$session = New-Object Microsoft.PowerShell.Commands.WebRequestSession
$session.Cookies.Add((New-Object System.Net.Cookie("session", "abc", "/", "httpbin.org")))
Invoke-WebRequest -UseBasicParsing -Uri "https://httpbin.org/anything/attach" `
-Method "POST" `
-WebSession $session `
-Headers @{
"method"="POST"
  "accept"="*/*"
  "origin"="https://httpbin.org"
} `
-ContentType "multipart/form-data; boundary=----WebKitFormBoundaryx" `
-Body "------WebKitFormBoundaryx`r`nContent-Disposition: form-data; name=`"title`"`r`n`r`nhello`r`n------WebKitFormBoundaryx`r`nContent-Disposition: form-data; name=`"upload`"; filename=`"a.txt`"`r`nContent-Type: text/plain`r`n`r`n`r`n------WebKitFormBoundaryx--`r`n""##;

/// A multipart upload with one text field and one file
pub const FETCH_MULTIPART: &str = r##"fetch("https://httpbin.org/anything/upload", {
  "headers": {
    "content-type": "multipart/form-data; boundary=----WebKitFormBoundaryx",
    "cookie": "session=abc"
  },
  "body": "------WebKitFormBoundaryx\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n------WebKitFormBoundaryx\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\nContent-Type: text/plain\r\n\r\n\r\n------WebKitFormBoundaryx--\r\n",
  "method": "POST",
  "mode": "cors"
});"##;

/// A form post with a query string and a non-standard verb
pub const FETCH_FORM_PURGE: &str = r##"fetch("https://httpbin.org/cache/purge?key=a%20b&force=1", {
  "headers": {
    "content-type": "application/x-www-form-urlencoded",
    "cookie": "session=abc"
  },
  "body": "reason=stale&by=me",
  "method": "PURGE"
});"##;

pub const SEC_CH_UA: &str = r#""Chromium";v="94", " Not A;Brand";v="99", "Opera GX";v="80""#;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/94.0.4606.61 Safari/537.36 OPR/80.0.4170.48";

/// Every capture the integration tests feed through the pipeline
pub fn all_captures() -> Vec<&'static str> {
    vec![
        FETCH_EXAMPLE_ONE,
        POWERSHELL_EXAMPLE_ONE,
        POWERSHELL_EXAMPLE_TWO,
        FETCH_MULTIPART,
        FETCH_FORM_PURGE,
        POWERSHELL_MULTIPART,
    ]
}

pub fn map(pairs: &[(&str, &str)]) -> StringMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn request(method: &str, url: &str, headers: &[(&str, &str)], cookies: &[(&str, &str)]) -> Request {
    let mut request = Request::new(method, Url::parse(url).expect("fixture URL"));
    request.headers = map(headers);
    request.cookies = map(cookies);
    request
}

pub fn expected_fetch_example_one() -> Request {
    request(
        "GET",
        "https://httpbin.org/cookies",
        &[
            ("accept", "application/json"),
            ("accept-language", "en-US,en;q=0.9"),
            ("sec-ch-ua", SEC_CH_UA),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", "\"Windows\""),
            ("sec-fetch-dest", "empty"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-site", "same-origin"),
            ("referer", "https://httpbin.org/"),
            ("referrer-policy", "strict-origin-when-cross-origin"),
        ],
        &[("hello", "world")],
    )
}

pub fn expected_powershell_example_one() -> Request {
    request(
        "GET",
        "https://httpbin.org/cookies",
        &[
            ("authority", "httpbin.org"),
            ("scheme", "https"),
            ("path", "/cookies"),
            ("sec-ch-ua", SEC_CH_UA),
            ("accept", "application/json"),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", "\"Windows\""),
            ("sec-fetch-site", "same-origin"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-dest", "empty"),
            ("referer", "https://httpbin.org/"),
            ("accept-encoding", "gzip, deflate, br"),
            ("accept-language", "en-US,en;q=0.9"),
            ("user-agent", USER_AGENT),
        ],
        &[("hello-from", "autorequests")],
    )
}

pub fn expected_powershell_example_two() -> Request {
    let mut request = request(
        "POST",
        "https://dev-api.impb.in/v1/document",
        &[
            ("authority", "dev-api.impb.in"),
            ("scheme", "https"),
            ("path", "/v1/document"),
            ("sec-ch-ua", SEC_CH_UA),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", "\"Windows\""),
            ("accept", "*/*"),
            ("origin", "https://dev.impb.in"),
            ("sec-fetch-site", "same-site"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-dest", "empty"),
            ("referer", "https://dev.impb.in/"),
            ("accept-encoding", "gzip, deflate, br"),
            ("accept-language", "en-US,en;q=0.9"),
            ("user-agent", USER_AGENT),
        ],
        &[],
    );
    request.body = Body::Json(json!({
        "content": "yeah",
        "settings": {
            "longUrls": false,
            "shortUrls": false,
            "instantDelete": false,
            "encrypted": false,
            "imageEmbed": false,
            "expiration": 14,
            "public": false,
            "editors": [],
            "language": "python",
        },
    }));
    request
}

pub fn expected_powershell_multipart() -> Request {
    let mut request = request(
        "POST",
        "https://httpbin.org/anything/attach",
        &[("accept", "*/*"), ("origin", "https://httpbin.org")],
        &[("session", "abc")],
    );
    let mut files = IndexMap::new();
    files.insert(
        "upload".to_string(),
        FileField::new("a.txt", Some("text/plain".to_string())),
    );
    request.body = Body::Multipart {
        files,
        fields: map(&[("title", "hello")]),
    };
    request
}

/// Fixture captures paired with the requests they parse into
pub fn parsing_fixtures() -> IndexMap<&'static str, Request> {
    let mut fixtures = IndexMap::new();
    fixtures.insert(FETCH_EXAMPLE_ONE, expected_fetch_example_one());
    fixtures.insert(POWERSHELL_EXAMPLE_ONE, expected_powershell_example_one());
    fixtures.insert(POWERSHELL_EXAMPLE_TWO, expected_powershell_example_two());
    fixtures.insert(POWERSHELL_MULTIPART, expected_powershell_multipart());
    fixtures
}

// ============================================================================
// CLI helpers
// ============================================================================

/// Result of running the reqforge CLI
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Isolated environment for a CLI run
pub struct TestEnvironment {
    config_dir: TempDir,
    stdin: Option<Vec<u8>>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().expect("Failed to create temp config dir"),
            stdin: None,
        }
    }

    pub fn set_stdin(&mut self, content: &str) -> &mut Self {
        self.stdin = Some(content.as_bytes().to_vec());
        self
    }

    /// Write `config.toml` into the isolated config directory
    pub fn write_config(&mut self, content: &str) -> &mut Self {
        std::fs::write(self.config_dir.path().join("config.toml"), content)
            .expect("Failed to write config");
        self
    }

    /// Write a capture file into the environment's directory
    pub fn write_capture(&self, name: &str, content: &str) -> PathBuf {
        let path = self.config_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write capture");
        path
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().to_path_buf()
    }
}

/// Run reqforge with the given arguments and environment
pub fn reqforge_with_env(args: &[&str], env: &TestEnvironment) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reqforge"));
    cmd.args(args);
    cmd.env("REQFORGE_CONFIG_DIR", env.config_path());
    cmd.env_remove("RUST_LOG");
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = match &env.stdin {
        Some(stdin_data) => {
            cmd.stdin(Stdio::piped());
            let mut child = cmd.spawn().expect("Failed to spawn command");
            {
                let stdin = child.stdin.as_mut().expect("Failed to open stdin");
                stdin.write_all(stdin_data).expect("Failed to write to stdin");
            }
            child.wait_with_output().expect("Failed to wait for command")
        }
        None => {
            cmd.stdin(Stdio::null());
            cmd.output().expect("Failed to execute command")
        }
    };
    parse_output(output)
}

/// Run reqforge with a capture on stdin
pub fn reqforge_stdin(args: &[&str], stdin: &str) -> CliResponse {
    let mut env = TestEnvironment::new();
    env.set_stdin(stdin);
    reqforge_with_env(args, &env)
}

fn parse_output(output: Output) -> CliResponse {
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(1),
    }
}
