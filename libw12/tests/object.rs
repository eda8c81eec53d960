use std::str::FromStr;

use libw12::{
    op::{are_of, Are, Header, Opcode},
    Image,
};

#[test]
fn test_decode_object() {
    let object = "3 2\nEs\nHG\nHg\nAG\n/3\n";
    let image = Image::from_str(object).unwrap();

    let header = Header::from_word(image.instructions[0]).unwrap();
    assert_eq!(header.opcode, Opcode::Jmp);
    assert_eq!(header.source, None);
    assert_eq!(are_of(image.instructions[1]), Are::Relocatable);
    assert_eq!(image.instructions[1].bits() >> 2, 113);
    assert_eq!(
        Header::from_word(image.instructions[2]).map(|h| h.opcode),
        Some(Opcode::Stop)
    );

    let data = image.data.iter().map(|w| w.as_i32()).collect::<Vec<_>>();
    assert_eq!(data, vec![6, -9]);
    assert_eq!(image.to_string(), object);
}
