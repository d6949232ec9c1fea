//! Benchmarks for encoding and decoding a credential-shaped document.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use futures_executor::block_on;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use ld_pack::{decode, encode, Options, StaticLoader};

const CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

fn loader() -> StaticLoader {
    StaticLoader::new().with(
        CONTEXT,
        json!({"@context": {
            "id": "@id",
            "type": "@type",
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "VerifiableCredential": {
                "@id": "https://www.w3.org/2018/credentials#VerifiableCredential",
                "@context": {
                    "issuer": {"@id": "https://www.w3.org/2018/credentials#issuer", "@type": "@id"},
                    "issuanceDate": {
                        "@id": "https://www.w3.org/2018/credentials#issuanceDate",
                        "@type": "xsd:dateTime"
                    },
                    "credentialSubject": {
                        "@id": "https://www.w3.org/2018/credentials#credentialSubject",
                        "@type": "@id"
                    }
                }
            },
            "proofValue": {
                "@id": "https://w3id.org/security#proofValue",
                "@type": "https://w3id.org/security#multibase"
            }
        }}),
    )
}

fn credential(rng: &mut impl Rng) -> Value {
    let signature: [u8; 32] = rng.gen();
    json!({
        "@context": CONTEXT,
        "id": "urn:uuid:188e8450-269e-11eb-b545-d3692cf35398",
        "type": ["VerifiableCredential"],
        "issuer": "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK",
        "issuanceDate": "2021-04-02T12:34:56Z",
        "credentialSubject": {"id": "https://subject.example/1"},
        "proofValue": format!("z{}", bs58::encode(signature).into_string())
    })
}

fn bench_encode(c: &mut Criterion) {
    let loader = loader();
    let options = Options::default();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let doc = credential(&mut rng);

    c.bench_function("encode_credential", |bench| {
        bench.iter(|| black_box(block_on(encode(&doc, &loader, &options)).unwrap()))
    });
}

fn bench_decode(c: &mut Criterion) {
    let loader = loader();
    let options = Options::default();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let bytes = block_on(encode(&credential(&mut rng), &loader, &options)).unwrap();

    c.bench_function("decode_credential", |bench| {
        bench.iter(|| black_box(block_on(decode(&bytes, &loader, &options)).unwrap()))
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
