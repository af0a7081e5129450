use crate::val::Val;

macro_rules! test_add {
    ($name:ident, $l:expr, $r:expr, $res:expr) => {
        #[test]
        fn $name() {
            let l: Val = $l.into();
            let r: Val = $r.into();
            let res: Val = $res.into();
            assert_eq!(l.add(&r).unwrap(), res);
        }
    };
}

test_add!(add_int, 1i64, 2i64, 3i64);
test_add!(add_mixed, 1i64, 0.5f64, 1.5f64);
test_add!(str_add_str, "Hello,", "World!", "Hello,World!");
test_add!(str_add_int, "hello", 123i64, "hello123");
test_add!(str_add_empty, "", "World!", "World!");

#[test]
fn mul_squares_ints() {
    let j = Val::Int(12);
    assert_eq!(j.mul(&j).unwrap(), Val::Int(144));
}

#[test]
fn int_overflow_wraps() {
    assert_eq!(Val::Int(i64::MAX).add(&Val::Int(1)).unwrap(), Val::Int(i64::MIN));
    assert_eq!(Val::Int(i64::MIN).add(&Val::Int(-1)).unwrap(), Val::Int(i64::MAX));
    assert_eq!(Val::Int(i64::MAX).mul(&Val::Int(2)).unwrap(), Val::Int(-2));
}

#[test]
fn add_rejects_list_operand() {
    let err = Val::empty_list().add(&Val::Int(1)).unwrap_err();
    assert!(err.to_string().contains("List + Int"));
}

#[test]
fn set_field_inserts_then_overwrites() {
    let mut obj = Val::empty_map();
    obj.set_field("bar", Val::Int(1)).unwrap();
    obj.set_field("bar", Val::Int(2)).unwrap();
    assert_eq!(obj.len(), Some(1));
    assert_eq!(obj.field("bar").unwrap(), &Val::Int(2));
}

#[test]
fn set_index_appends_at_end_only() {
    let mut arr = Val::empty_list();
    arr.set_index(0, Val::Int(0)).unwrap();
    arr.set_index(1, Val::Int(1)).unwrap();
    arr.set_index(0, Val::Int(9)).unwrap();
    assert_eq!(arr, Val::from(vec![9i64, 1]));

    let err = arr.set_index(5, Val::Nil).unwrap_err();
    assert!(err.to_string().contains("out of bounds"));
}

#[test]
fn nested_path_mutation() {
    let mut obj = Val::empty_map();
    obj.set_field("foo", Val::List(vec![Val::empty_map(), Val::empty_list()]))
        .unwrap();

    let foo = obj.field_mut("foo").unwrap();
    foo.index_mut(0).unwrap().set_field("bar", Val::Int(7)).unwrap();
    foo.index_mut(1).unwrap().set_index(0, Val::from("x")).unwrap();

    assert_eq!(obj.to_string(), "{foo: [{bar: 7}, [x]]}");
}

#[test]
fn field_access_on_non_map_fails() {
    let mut v = Val::Int(3);
    assert!(v.field("foo").is_err());
    assert!(v.set_field("foo", Val::Nil).is_err());
    assert!(v.set_index(0, Val::Nil).is_err());
}

#[test]
fn serializes_as_plain_json() {
    let v = Val::from(vec![Val::Int(1), Val::from("a"), Val::Nil]);
    assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,"a",null]"#);
}
