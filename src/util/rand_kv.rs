use bytes::Bytes;

pub fn get_test_key(i: usize) -> Bytes {
  Bytes::from(std::format!("flydb-key-{:09}", i))
}

pub fn get_test_value(i: usize) -> Bytes {
  Bytes::from(std::format!(
    "flydb-value-value-value-value-value-value-value-value-value-{:09}",
    i
  ))
}

pub fn get_test_member(i: usize) -> String {
  std::format!("flydb-member-{:09}", i)
}

pub fn get_test_payload(i: usize) -> Bytes {
  Bytes::from(std::format!("flydb-payload-{:09}", i))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_get_test_key_value() {
    for i in 0..10 {
      assert!(!get_test_key(i).is_empty());
      assert!(!get_test_value(i).is_empty());
    }
  }

  #[test]
  fn test_members_sort_by_index() {
    assert!(get_test_member(9) < get_test_member(10));
    assert_eq!(get_test_payload(3), Bytes::from("flydb-payload-000000003"));
  }
}
