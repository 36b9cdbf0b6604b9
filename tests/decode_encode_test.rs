extern crate rosc_rt;

use rosc_rt::{decoder, encoder, ArgValue, OscColor, OscMidiMessage, OscTime};

extern crate hex;

const GOLDEN_MESSAGE_WO_ARGS: &str = "2f736f6d652f6164647200002c000000";

#[test]
fn message_without_args_matches_golden_bytes() {
    let mut buf = [0u8; 32];
    let len = encoder::message(&mut buf, "/some/addr", "", &[]);

    assert_eq!(hex::decode(GOLDEN_MESSAGE_WO_ARGS).unwrap(), &buf[..len]);
    assert_eq!(decoder::message_length(&buf[..len]), Some(len));
    assert_eq!(decoder::narguments(&buf[..len]), Some(0));
}

#[test]
fn message_with_every_argument_type_round_trips() {
    let blob = [1u8, 2, 3];
    let args = [
        ArgValue::Int(4),
        ArgValue::Long(42),
        ArgValue::Float(3.1415926),
        ArgValue::Double(3.14159265359),
        ArgValue::String("This is a string."),
        ArgValue::Symbol("a-symbol"),
        ArgValue::Blob(&blob),
        ArgValue::Color(OscColor {
            red: 123,
            green: 1,
            blue: 200,
            alpha: 99,
        }),
        ArgValue::Char('c'),
        ArgValue::Bool(false),
        ArgValue::Bool(true),
        ArgValue::Nil,
        ArgValue::Inf,
        ArgValue::Time(OscTime::from((0x1234_5678, 0x9abc_def0))),
        ArgValue::Midi(OscMidiMessage {
            port: 4,
            status: 0x90,
            data1: 60,
            data2: 127,
        }),
    ];
    let tags: String = args.iter().map(|a| a.tag()).collect();

    let mut buf = [0u8; 256];
    let len = encoder::message(&mut buf, "/another/address/1", &tags, &args);
    assert_ne!(len, 0);

    assert_eq!(decoder::message_length(&buf[..len]), Some(len));
    assert_eq!(decoder::narguments(&buf[..len]), Some(args.len()));
    for (i, expected) in args.iter().enumerate() {
        assert_eq!(decoder::argument(&buf[..len], i).as_ref(), Some(expected));
    }
}

#[test]
fn bundle_header_and_elements_round_trip() {
    let mut bundle_buf = [0u8; 128];
    let mut msg_a = [0u8; 32];
    let mut msg_b = [0u8; 32];

    let hdr_len = encoder::bundle_header(&mut bundle_buf, OscTime::from((1, 2)));
    let a_len = encoder::message(&mut msg_a, "/a", "i", &[ArgValue::Int(1)]);
    let b_len = encoder::message(&mut msg_b, "/b", "i", &[ArgValue::Int(2)]);

    let mut pos = hdr_len;
    bundle_buf[pos..pos + 4].copy_from_slice(&(a_len as u32).to_be_bytes());
    pos += 4;
    bundle_buf[pos..pos + a_len].copy_from_slice(&msg_a[..a_len]);
    pos += a_len;
    bundle_buf[pos..pos + 4].copy_from_slice(&(b_len as u32).to_be_bytes());
    pos += 4;
    bundle_buf[pos..pos + b_len].copy_from_slice(&msg_b[..b_len]);
    pos += b_len;

    let bundle = &bundle_buf[..pos];
    assert!(decoder::bundle_p(bundle));
    assert_eq!(decoder::bundle_timetag(bundle), Some(OscTime::from((1, 2))));

    let elements: Vec<&[u8]> = decoder::bundle_elements(bundle).collect();
    assert_eq!(elements.len(), 2);
    assert_eq!(decoder::address(elements[0]), Some("/a"));
    assert_eq!(decoder::address(elements[1]), Some("/b"));
}
