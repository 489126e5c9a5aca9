//! Basic example showing serialization and deserialization

use flatcable::{deserialize, serialize, BinaryIo, CodecConfig, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Flatcable Rust Example ===\n");
    let config = CodecConfig::default();

    // Example 1: Simple types
    println!("Example 1: Simple types");
    {
        let value = Value::from(42u32);

        let mut buffer = Vec::new();
        serialize(&mut buffer, &value, "I", &config)?;
        println!("  Serialized I(42) to {} bytes: {:02x?}", buffer.len(), buffer);

        let deserialized = deserialize(&buffer[..], "I", &config)?;
        println!("  Deserialized: {:?}\n", deserialized);
    }

    // Example 2: Short string with an encoding hint
    println!("Example 2: String");
    {
        let value = Value::from("räksmörgås");

        let mut buffer = Vec::new();
        serialize(&mut buffer, &value, "sstr/latin-1", &config)?;
        println!("  Serialized latin-1 string to {} bytes", buffer.len());

        let deserialized = deserialize(&buffer[..], "sstr/latin-1", &config)?;
        println!("  Deserialized: {:?}\n", deserialized);
    }

    // Example 3: Map, written in key order
    println!("Example 3: Map");
    {
        let value = Value::map([("swag", 31412359u64), ("bar", 4711), ("xyzzy", 42)]);

        let mut buffer = Vec::new();
        serialize(&mut buffer, &value, "map:str/ascii:L", &config)?;
        println!("  Serialized map to {} bytes", buffer.len());

        let deserialized = deserialize(&buffer[..], "map:str/ascii:L", &config)?;
        println!("  Deserialized: {:?}\n", deserialized);
    }

    // Example 4: Several values through one session
    println!("Example 4: Session");
    {
        let mut bio = BinaryIo::in_memory();
        let mut n = bio.write(&Value::vec([1i8, 2, 3, -19]), "vec:b")?;
        n += bio.write(&Value::set([3u64, 1, 2]), "set:L")?;
        n += bio.write(&Value::Null, "vec:sstr")?;
        println!("  Wrote {} bytes", n);

        let mut bio = BinaryIo::from_bytes(bio.into_bytes());
        for descriptor in ["vec:b", "set:L", "vec:sstr"] {
            println!("  {} -> {:?}", descriptor, bio.read(descriptor)?);
        }
    }

    Ok(())
}
