//! Common test utilities: in-memory source archives served by wiremock.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A stand-in for serd's bundled waf. Records the configure line, fakes a
/// build, and installs headers, a library, pkg-config data and a man page.
pub const FAKE_WAF: &str = r#"#!/bin/sh
set -e
case "$1" in
  configure)
    shift
    for arg in "$@"; do
      case "$arg" in
        --prefix=*) echo "${arg#--prefix=}" > .prefix ;;
      esac
    done
    test -f waflib/autowaf.py
    echo "CFLAGS=$CFLAGS $*" > .configured
    ;;
  build)
    test -f .configured
    mkdir -p build
    echo "ar" > build/libserd-0.a
    ;;
  install)
    prefix=$(cat .prefix)
    mkdir -p "$prefix/include/serd-0/serd" "$prefix/lib/pkgconfig" "$prefix/share/man/man1"
    cp serd/serd.h "$prefix/include/serd-0/serd/serd.h"
    cp build/libserd-0.a "$prefix/lib/libserd-0.a"
    echo "Name: Serd" > "$prefix/lib/pkgconfig/serd-0.pc"
    echo "serdi" > "$prefix/share/man/man1/serdi.1"
    ;;
  *)
    echo "unknown command $1" >&2
    exit 2
    ;;
esac
"#;

pub const LICENSE_TEXT: &str = "Copyright 2011-2023 David Robillard\n\nISC License\n";

/// One archive member: path under the root dir, contents, mode.
pub type Member<'a> = (&'a str, &'a [u8], u32);

/// Build a gzip-compressed tarball with every member under `root/`.
pub fn tar_gz(root: &str, members: &[Member<'_>]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    dir.set_cksum();
    builder
        .append_data(&mut dir, format!("{}/", root), std::io::empty())
        .unwrap();

    for (name, data, mode) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", root, name), *data)
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// serd source tarball with the fake waf, a header and (optionally) COPYING.
pub fn serd_archive(version: &str, with_license: bool) -> Vec<u8> {
    let mut members: Vec<Member<'_>> = vec![
        ("waf", FAKE_WAF.as_bytes(), 0o755),
        ("wscript", &b"#!/usr/bin/env python\n"[..], 0o644),
        ("serd/serd.h", &b"#define SERD_API\n"[..], 0o644),
    ];
    if with_license {
        members.push(("COPYING", LICENSE_TEXT.as_bytes(), 0o644));
    }
    tar_gz(&format!("serd-{}", version), &members)
}

pub fn autowaf_archive() -> Vec<u8> {
    tar_gz(
        "autowaf-cc37724",
        &[
            ("autowaf.py", &b"# autowaf\n"[..], 0o644),
            ("extras/lv2.py", &b"# lv2\n"[..], 0o644),
        ],
    )
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Serve `body` at `route`, expecting exactly `times` requests.
pub async fn serve(server: &MockServer, route: &str, body: Vec<u8>, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Source table TOML pointing `version` at archives on `server`.
pub fn sources_toml(server: &MockServer, version: &str, serd: &[u8], autowaf: &[u8]) -> String {
    format!(
        r#"[sources."{version}".serd]
url = "{uri}/serd-{version}.tar.gz"
sha256 = "{serd}"

[sources."{version}".autowaf]
url = "{uri}/autowaf.tar.gz"
sha256 = "{autowaf}"
"#,
        uri = server.uri(),
        version = version,
        serd = sha256_hex(serd),
        autowaf = sha256_hex(autowaf),
    )
}

/// Mount both archives for `version` and return the matching source table.
pub async fn serve_sources(
    server: &MockServer,
    version: &str,
    with_license: bool,
    times: u64,
) -> String {
    let serd = serd_archive(version, with_license);
    let autowaf = autowaf_archive();
    let table = sources_toml(server, version, &serd, &autowaf);
    serve(server, &format!("/serd-{}.tar.gz", version), serd, times).await;
    serve(server, "/autowaf.tar.gz", autowaf, times).await;
    table
}
