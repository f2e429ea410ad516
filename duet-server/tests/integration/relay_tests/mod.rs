mod test_negotiation_relayed_in_order;
