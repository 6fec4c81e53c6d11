//! PDF inspection and encryption helpers.

use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};
use rc4::{consts::*, KeyInit, Rc4, StreamCipher};

/// Padding string from the standard security handler.
const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// All permissions granted.
const PERMISSIONS: i32 = -44;

const FILE_ID: &[u8; 16] = b"blackout-fixture";

/// 40-bit keys are 5 bytes.
const KEY_LEN: usize = 5;

fn pad_password(password: &str) -> [u8; 32] {
    let bytes = password.as_bytes();
    let n = bytes.len().min(32);
    let mut out = [0u8; 32];
    out[..n].copy_from_slice(&bytes[..n]);
    out[n..].copy_from_slice(&PASSWORD_PAD[..32 - n]);
    out
}

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut buf = data.to_vec();
    match key.len() {
        5 => Rc4::<U5>::new(key.into()).apply_keystream(&mut buf),
        10 => Rc4::<U10>::new(key.into()).apply_keystream(&mut buf),
        n => panic!("no RC4 cipher for a {}-byte key", n),
    }
    buf
}

fn object_key(file_key: &[u8], id: ObjectId) -> Vec<u8> {
    let mut ctx = md5::Context::new();
    ctx.consume(file_key);
    ctx.consume(&id.0.to_le_bytes()[..3]);
    ctx.consume(&id.1.to_le_bytes()[..2]);
    let digest = ctx.compute();
    digest[..(file_key.len() + 5).min(16)].to_vec()
}

/// Encrypts every stream with the revision 2 standard security handler and
/// installs the `Encrypt` dictionary and file ID.
pub fn encrypt_rc4_40(doc: &mut Document, user_password: &str, owner_password: &str) {
    let user_padded = pad_password(user_password);

    let owner_digest = md5::compute(pad_password(owner_password));
    let owner_entry = rc4(&owner_digest[..KEY_LEN], &user_padded);

    let mut ctx = md5::Context::new();
    ctx.consume(user_padded);
    ctx.consume(&owner_entry);
    ctx.consume(PERMISSIONS.to_le_bytes());
    ctx.consume(FILE_ID);
    let file_key = ctx.compute()[..KEY_LEN].to_vec();

    let user_entry = rc4(&file_key, &PASSWORD_PAD);

    for (&id, object) in doc.objects.iter_mut() {
        if let Object::Stream(stream) = object {
            let encrypted = rc4(&object_key(&file_key, id), &stream.content);
            stream.set_content(encrypted);
        }
    }

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1i64,
        "R" => 2i64,
        "Length" => 40i64,
        "O" => Object::String(owner_entry, StringFormat::Hexadecimal),
        "U" => Object::String(user_entry, StringFormat::Hexadecimal),
        "P" => PERMISSIONS as i64,
    });
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(FILE_ID.to_vec(), StringFormat::Hexadecimal),
            Object::String(FILE_ID.to_vec(), StringFormat::Hexadecimal),
        ]),
    );
}

/// Relabels the `Encrypt` dictionary as the AES-128 (V4, R4) crypt filter
/// handler. The streams stay RC4-encrypted, so no password can open it.
pub fn relabel_as_aes(doc: &mut Document) {
    let Ok(id) = doc.trailer.get(b"Encrypt").and_then(Object::as_reference) else {
        return;
    };
    if let Ok(Object::Dictionary(encrypt)) = doc.get_object_mut(id) {
        encrypt.set("V", 4i64);
        encrypt.set("R", 4i64);
        encrypt.set("Length", 128i64);
        encrypt.set(
            "CF",
            dictionary! {
                "StdCF" => dictionary! {
                    "CFM" => "AESV2",
                    "Length" => 16i64,
                    "AuthEvent" => "DocOpen",
                },
            },
        );
        encrypt.set("StmF", "StdCF");
        encrypt.set("StrF", "StdCF");
    }
}

/// True when a page's content ends with the black fill overlay.
pub fn is_blackout_content(content: &[u8]) -> bool {
    let text = String::from_utf8_lossy(content);
    text.contains("0 0 0 rg") && text.trim_end().ends_with("re\nf\nQ")
}

/// Zero-based indices of pages carrying the blackout overlay.
pub fn blacked_out_pages(bytes: &[u8]) -> Vec<usize> {
    let doc = Document::load_mem(bytes).expect("output should parse");
    doc.get_pages()
        .values()
        .enumerate()
        .filter(|(_, id)| {
            doc.get_page_content(**id)
                .map(|content| is_blackout_content(&content))
                .unwrap_or(false)
        })
        .map(|(index, _)| index)
        .collect()
}

pub fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes)
        .expect("document should parse")
        .get_pages()
        .len()
}

/// The fill rectangle `[x, y, w, h]` painted on a page, if any.
pub fn overlay_rect(bytes: &[u8], index: usize) -> Option<[f32; 4]> {
    let doc = Document::load_mem(bytes).ok()?;
    let id = *doc.get_pages().values().nth(index)?;
    let content = doc.get_page_content(id).ok()?;
    let text = String::from_utf8_lossy(&content).to_string();
    let line = text.lines().rev().find(|line| line.ends_with(" re"))?;
    let values: Vec<f32> = line
        .split_whitespace()
        .take(4)
        .filter_map(|v| v.parse().ok())
        .collect();
    match values.as_slice() {
        [x, y, w, h] => Some([*x, *y, *w, *h]),
        _ => None,
    }
}

pub fn is_encrypted(bytes: &[u8]) -> bool {
    Document::load_mem(bytes)
        .map(|doc| doc.is_encrypted())
        .unwrap_or(false)
}
